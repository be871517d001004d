//! # Mindmeld
//!
//! Lobby server for Mindmeld, a party game where everyone answers the
//! same category prompt and the group scores when enough answers match.
//!
//! The server is request/response over WebSocket: each frame a client
//! sends is one JSON [`Request`](mindmeld_protocol::Request), and it gets
//! exactly one [`Response`](mindmeld_protocol::Response) back. Clients
//! poll `LobbyStatus` to see what other players did.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mindmeld::prelude::*;
//!
//! # async fn run() -> Result<(), MindmeldError> {
//! let server = MindmeldServer::<JsonCodec>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod service;
mod ws;

pub use config::{BIND_ENV, IDLE_TIMEOUT_ENV, ServerConfig};
pub use error::{MindmeldError, TransportError};
pub use server::{MindmeldServer, MindmeldServerBuilder};
pub use service::{LobbyService, SubmitOutcome};
pub use ws::ConnectionId;

/// Everything needed to run or embed a server.
pub mod prelude {
    pub use crate::{
        LobbyService, MindmeldError, MindmeldServer, MindmeldServerBuilder,
        ServerConfig, SubmitOutcome,
    };
    pub use mindmeld_lobby::{
        Categories, Clock, LobbyConfig, LobbyError, LobbyLimits,
        LobbyRegistry, ManualClock, SystemClock,
    };
    pub use mindmeld_protocol::{
        Codec, Command, JsonCodec, LobbyAction, LobbyCode, LobbySnapshot,
        Player, PlayerId, Request, Response, RoundResult, Settings,
        SettingsPatch,
    };
}

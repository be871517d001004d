//! Wire protocol for Mindmeld.
//!
//! This crate defines the "language" that clients and the lobby server
//! speak:
//!
//! - **Identity** ([`PlayerId`], [`LobbyCode`]): who is talking, and
//!   which lobby they mean.
//! - **Records** ([`Player`], [`Settings`], [`LobbySnapshot`],
//!   [`RoundResult`]): the data every response carries.
//! - **Messages** ([`Request`], [`Response`], [`LobbyAction`]): one
//!   request in, one response out. Clients poll; the server never pushes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about rounds, scoring or presence.
//! It only describes the shapes that cross the wire.
//!
//! ```text
//! Transport (bytes) → Protocol (Request/Response) → Lobby (game rules)
//! ```

mod codec;
mod error;
mod ids;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use ids::{LobbyCode, PlayerId};
pub use messages::{ActionData, Command, LobbyAction, Request, Response};
pub use types::{
    LobbySnapshot, Millis, Player, RoundResult, RoundSnapshot, Settings,
    SettingsPatch,
};

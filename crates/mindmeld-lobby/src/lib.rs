//! Lobby and round state machine for Mindmeld.
//!
//! Everything in this crate is a synchronous, in-memory state transition.
//! There is no I/O and no background task: callers (the service layer)
//! hold the registry behind one lock and run each operation to
//! completion before the next one starts.
//!
//! # Key types
//!
//! - [`LobbyRegistry`]: owns every live lobby, keyed by code; sweeps
//!   stale ones
//! - [`LobbySession`]: one lobby (roster, settings, round state)
//! - [`RoundState`]: answer collection, completion, majority and scoring
//! - [`Presence`]: connected / last-seen bookkeeping on [`Player`]s
//! - [`CategoryProvider`]: where round prompts come from
//! - [`Clock`]: injected time source, so expiry is testable
//! - [`LobbyConfig`]: player limits, retention, default settings
//!
//! [`Player`]: mindmeld_protocol::Player

mod category;
mod clock;
mod code;
mod config;
mod error;
mod presence;
mod registry;
mod round;
mod session;

pub use category::{
    Catalog, Categories, CategoryProvider, FixedCategory, RandomCategories,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use code::{CodeGenerator, RandomCodes};
pub use config::{LobbyConfig, LobbyLimits, RoundPhase};
pub use error::LobbyError;
pub use presence::Presence;
pub use registry::LobbyRegistry;
pub use round::{RoundState, majority, match_percentage, normalize_answer};
pub use session::LobbySession;

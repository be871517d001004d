//! Error types for the lobby layer.

use mindmeld_protocol::{LobbyCode, PlayerId, ProtocolError};

/// Errors that can occur during lobby operations.
///
/// Every variant is a terminal, caller-visible outcome. When an operation
/// returns one of these, it has changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// No lobby is registered under this code.
    #[error("lobby {0} not found")]
    LobbyNotFound(LobbyCode),

    /// The lobby exists but this player isn't on its roster.
    #[error("player {player} not found in lobby {code}")]
    PlayerNotFound { code: LobbyCode, player: PlayerId },

    /// A non-host tried a host-only action.
    #[error("only the host can {0}")]
    Forbidden(&'static str),

    /// The lobby's game is running, so it can't be joined.
    #[error("game in lobby {0} has already started")]
    GameInProgress(LobbyCode),

    /// Answers are only accepted while a game is running.
    #[error("game in lobby {0} is not active")]
    GameNotActive(LobbyCode),

    /// The roster is at capacity.
    #[error("lobby {code} is full (max {max} players)")]
    LobbyFull { code: LobbyCode, max: usize },

    /// Too few players to start.
    #[error("at least {need} players are required, lobby has {have}")]
    NotEnoughPlayers { have: usize, need: usize },

    /// The answer arrived after the round's time limit.
    #[error("time expired: {elapsed_ms} ms elapsed, limit is {limit_secs} s")]
    TimeExpired { elapsed_ms: u64, limit_secs: u32 },

    /// `UpdateLobby` named an action the server doesn't implement.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A required request field was missing or blank.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl LobbyError {
    /// Returns the HTTP-style status code reported to clients.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::LobbyNotFound(_) | Self::PlayerNotFound { .. } => 404,
            Self::Forbidden(_) => 403,
            Self::GameInProgress(_)
            | Self::GameNotActive(_)
            | Self::LobbyFull { .. }
            | Self::NotEnoughPlayers { .. }
            | Self::TimeExpired { .. }
            | Self::UnknownAction(_)
            | Self::Validation(_) => 400,
        }
    }
}

/// A request that failed to decode or validate is reported with the same
/// taxonomy as a rejected game action.
impl From<ProtocolError> for LobbyError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnknownAction(action) => Self::UnknownAction(action),
            ProtocolError::MissingField(field) => {
                Self::Validation(format!("{field} is required"))
            }
            other => Self::Validation(other.to_string()),
        }
    }
}

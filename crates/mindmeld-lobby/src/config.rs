//! Lobby configuration and round phases.

use std::time::Duration;

use mindmeld_protocol::Settings;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Roster size limits, copied into every lobby at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyLimits {
    /// Minimum players required to start a game.
    pub min_players: usize,

    /// Maximum players allowed on a roster.
    pub max_players: usize,
}

impl Default for LobbyLimits {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
        }
    }
}

/// Registry-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    pub limits: LobbyLimits,

    /// How long a lobby lives, measured from creation. Older lobbies are
    /// dropped by the next sweep regardless of activity.
    pub retention: Duration,

    /// Settings every new lobby starts with.
    pub default_settings: Settings,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            limits: LobbyLimits::default(),
            retention: Duration::from_secs(6 * 60 * 60),
            default_settings: Settings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoundPhase
// ---------------------------------------------------------------------------

/// Where a lobby is in its round cycle.
///
/// ```text
/// Waiting ──(start)──→ Open ──(everyone answered / time up)──→ Resolved
///                       ↑                                         │
///                       └──────────────(nextRound)────────────────┘
/// ```
///
/// - **Waiting**: no game running. Joins and settings changes allowed,
///   answers rejected.
/// - **Open**: collecting answers for the current round.
/// - **Resolved**: the current round has a result. Answers are still
///   accepted until the host advances (each completing submission
///   resolves again).
///
/// The phase is derived from the round state rather than stored, so it
/// can never drift out of sync with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Waiting,
    Open,
    Resolved,
}

impl RoundPhase {
    /// Returns `true` if new players may join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` while a game is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Resolved)
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Open => write!(f, "Open"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}

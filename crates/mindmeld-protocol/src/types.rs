//! Records that travel inside responses.
//!
//! All JSON field names are camelCase because the browser client reads
//! them directly (`lobby.gameState.roundAnswers`, `player.isHost`, ...).

use serde::{Deserialize, Serialize};

use crate::{LobbyCode, PlayerId};

/// Milliseconds since the Unix epoch.
///
/// Used for every timestamp on the wire (`lastSeen`, `createdAt`,
/// `roundStartTime`). A plain integer keeps it trivial for JavaScript
/// clients (`Date.now()` uses the same unit).
pub type Millis = u64;

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One member of a lobby roster.
///
/// Players are never removed from a lobby. When someone leaves, only
/// `connected` flips to `false`; their score and team stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Exactly one player per lobby has this set: the creator.
    pub is_host: bool,
    /// Team label assigned by the host. `None` until assigned.
    pub team: Option<String>,
    pub connected: bool,
    pub last_seen: Millis,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Host-controlled game settings.
///
/// Values are not range-checked here. The host's client is trusted to
/// send sensible numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Seconds players have to answer once a round opens.
    pub round_time: u32,
    /// How many rounds the client intends to play.
    pub total_rounds: u32,
    /// Percentage (0–100) of connected players that must agree for a
    /// round to count as a success.
    pub match_threshold: u32,
    /// Free-form mode label (`"all"`, `"teams"`, ...).
    pub game_mode: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round_time: 30,
            total_rounds: 5,
            match_threshold: 90,
            game_mode: "all".to_string(),
        }
    }
}

impl Settings {
    /// Shallow-merges `patch` into these settings.
    ///
    /// Every field present in the patch replaces the current value;
    /// every absent field is left alone.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(round_time) = patch.round_time {
            self.round_time = round_time;
        }
        if let Some(total_rounds) = patch.total_rounds {
            self.total_rounds = total_rounds;
        }
        if let Some(match_threshold) = patch.match_threshold {
            self.match_threshold = match_threshold;
        }
        if let Some(game_mode) = patch.game_mode {
            self.game_mode = game_mode;
        }
    }
}

/// A partial [`Settings`] update. `None` means "keep the current value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_mode: Option<String>,
}

// ---------------------------------------------------------------------------
// Round results
// ---------------------------------------------------------------------------

/// The outcome of one resolved round, sent back so clients can reveal
/// what everybody answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    /// The most frequent non-empty answer (`""` if nobody answered).
    pub most_common_answer: String,
    /// How many players gave the most common answer.
    pub match_count: u32,
    /// `match_count` as a rounded percentage of the connected players.
    pub match_percentage: u32,
    /// `true` if `match_percentage` reached the lobby's threshold.
    pub round_success: bool,
    /// The streak after this round was scored.
    pub streak: u32,
    /// Every `(player, answer)` pair recorded this round, in the order
    /// the players first answered.
    pub all_answers: Vec<(PlayerId, String)>,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// The round half of a [`LobbySnapshot`].
///
/// `round_answers` and `scores` are lists of `(key, value)` pairs rather
/// than JSON objects so their order is stable and obvious on the wire:
/// `[["p1", "cat"], ["p2", "dog"]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub is_active: bool,
    pub current_round: u32,
    pub current_category: Option<String>,
    pub round_answers: Vec<(PlayerId, String)>,
    pub scores: Vec<(PlayerId, u64)>,
    pub streak: u32,
    pub round_start_time: Option<Millis>,
    /// Result of the most recent resolution in the current round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<RoundResult>,
}

/// Everything a client needs to render a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbySnapshot {
    pub code: LobbyCode,
    pub host_id: PlayerId,
    /// Roster in join order. The host is always first.
    pub players: Vec<Player>,
    pub settings: Settings,
    pub game_state: RoundSnapshot,
    pub created_at: Millis,
}

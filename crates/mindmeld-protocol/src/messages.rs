//! Request and response envelopes.
//!
//! A client sends one [`Request`] and gets exactly one [`Response`] back.
//! There is no server push: clients poll with `LobbyStatus` to see what
//! other players did.
//!
//! Requests arrive loosely typed (every field optional, the update action
//! as a bare string) because that is what browsers send. [`Command`] is
//! the validated form the rest of the server works with; converting a
//! `Request` into a `Command` is where missing fields and unknown actions
//! are caught.

use serde::{Deserialize, Serialize};

use crate::{
    LobbyCode, LobbySnapshot, PlayerId, ProtocolError, RoundResult,
    SettingsPatch,
};

// ---------------------------------------------------------------------------
// Request: what arrives on the wire
// ---------------------------------------------------------------------------

/// A client request, as decoded from JSON.
///
/// `#[serde(tag = "type")]` produces the internally tagged form:
/// `{ "type": "JoinLobby", "lobbyCode": "AB12CD", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Request {
    /// Create a lobby with the caller as host.
    CreateLobby {
        player_name: Option<String>,
        player_id: Option<PlayerId>,
    },

    /// Join (or rejoin) an existing lobby.
    JoinLobby {
        lobby_code: Option<LobbyCode>,
        player_name: Option<String>,
        player_id: Option<PlayerId>,
    },

    /// Settings change, team assignment, heartbeat, or round advance.
    ///
    /// `action` is one of `updateSettings`, `assignTeam`, `heartbeat`,
    /// `nextRound`; `data` carries the action's arguments.
    UpdateLobby {
        lobby_code: Option<LobbyCode>,
        player_id: Option<PlayerId>,
        action: Option<String>,
        #[serde(default)]
        data: Option<ActionData>,
    },

    /// Poll the lobby. Also counts as a sign of life from the caller.
    LobbyStatus {
        lobby_code: Option<LobbyCode>,
        player_id: Option<PlayerId>,
    },

    /// Host starts the game.
    StartGame {
        lobby_code: Option<LobbyCode>,
        player_id: Option<PlayerId>,
    },

    /// Submit (or replace) this round's answer.
    SubmitAnswer {
        lobby_code: Option<LobbyCode>,
        player_id: Option<PlayerId>,
        answer: Option<String>,
    },
}

/// Arguments for [`Request::UpdateLobby`].
///
/// One flat bag for every action: settings fields for `updateSettings`,
/// `targetPlayerId` and `team` for `assignTeam`. Fields an action doesn't
/// use are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionData {
    #[serde(flatten)]
    pub settings: SettingsPatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

// ---------------------------------------------------------------------------
// Command: a validated request
// ---------------------------------------------------------------------------

/// A host (or, for heartbeats, any player) action on an existing lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyAction {
    UpdateSettings(SettingsPatch),
    AssignTeam {
        target_player_id: PlayerId,
        team: Option<String>,
    },
    Heartbeat,
    NextRound,
}

impl LobbyAction {
    /// Parses an action name and its data.
    ///
    /// # Errors
    /// - [`ProtocolError::UnknownAction`] for an unrecognized name.
    /// - [`ProtocolError::MissingField`] if `assignTeam` has no target.
    pub fn parse(
        action: &str,
        data: Option<ActionData>,
    ) -> Result<Self, ProtocolError> {
        let data = data.unwrap_or_default();
        match action {
            "updateSettings" => Ok(Self::UpdateSettings(data.settings)),
            "assignTeam" => {
                let target_player_id = data
                    .target_player_id
                    .ok_or(ProtocolError::MissingField("targetPlayerId"))?;
                Ok(Self::AssignTeam {
                    target_player_id,
                    team: data.team,
                })
            }
            "heartbeat" => Ok(Self::Heartbeat),
            "nextRound" => Ok(Self::NextRound),
            other => Err(ProtocolError::UnknownAction(other.to_string())),
        }
    }

    /// The wire name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateSettings(_) => "updateSettings",
            Self::AssignTeam { .. } => "assignTeam",
            Self::Heartbeat => "heartbeat",
            Self::NextRound => "nextRound",
        }
    }
}

/// A request with every required field present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateLobby {
        player_id: PlayerId,
        player_name: String,
    },
    JoinLobby {
        code: LobbyCode,
        player_id: PlayerId,
        player_name: String,
    },
    UpdateLobby {
        code: LobbyCode,
        player_id: PlayerId,
        action: LobbyAction,
    },
    LobbyStatus {
        code: LobbyCode,
        player_id: PlayerId,
    },
    StartGame {
        code: LobbyCode,
        player_id: PlayerId,
    },
    SubmitAnswer {
        code: LobbyCode,
        player_id: PlayerId,
        answer: Option<String>,
    },
}

impl Command {
    /// The player issuing this command.
    pub fn player_id(&self) -> &PlayerId {
        match self {
            Self::CreateLobby { player_id, .. }
            | Self::JoinLobby { player_id, .. }
            | Self::UpdateLobby { player_id, .. }
            | Self::LobbyStatus { player_id, .. }
            | Self::StartGame { player_id, .. }
            | Self::SubmitAnswer { player_id, .. } => player_id,
        }
    }

    /// The lobby this command targets. `None` for `CreateLobby`, whose
    /// code is only known once the lobby exists.
    pub fn lobby_code(&self) -> Option<&LobbyCode> {
        match self {
            Self::CreateLobby { .. } => None,
            Self::JoinLobby { code, .. }
            | Self::UpdateLobby { code, .. }
            | Self::LobbyStatus { code, .. }
            | Self::StartGame { code, .. }
            | Self::SubmitAnswer { code, .. } => Some(code),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateLobby { .. } => "CreateLobby",
            Self::JoinLobby { .. } => "JoinLobby",
            Self::UpdateLobby { .. } => "UpdateLobby",
            Self::LobbyStatus { .. } => "LobbyStatus",
            Self::StartGame { .. } => "StartGame",
            Self::SubmitAnswer { .. } => "SubmitAnswer",
        }
    }
}

impl TryFrom<Request> for Command {
    type Error = ProtocolError;

    fn try_from(request: Request) -> Result<Self, Self::Error> {
        Ok(match request {
            Request::CreateLobby {
                player_name,
                player_id,
            } => Self::CreateLobby {
                player_name: require_text(player_name, "playerName")?,
                player_id: require_player(player_id)?,
            },
            Request::JoinLobby {
                lobby_code,
                player_name,
                player_id,
            } => Self::JoinLobby {
                code: require_code(lobby_code)?,
                player_name: require_text(player_name, "playerName")?,
                player_id: require_player(player_id)?,
            },
            Request::UpdateLobby {
                lobby_code,
                player_id,
                action,
                data,
            } => {
                let code = require_code(lobby_code)?;
                let player_id = require_player(player_id)?;
                let action = action.ok_or(ProtocolError::MissingField("action"))?;
                Self::UpdateLobby {
                    code,
                    player_id,
                    action: LobbyAction::parse(&action, data)?,
                }
            }
            Request::LobbyStatus {
                lobby_code,
                player_id,
            } => Self::LobbyStatus {
                code: require_code(lobby_code)?,
                player_id: require_player(player_id)?,
            },
            Request::StartGame {
                lobby_code,
                player_id,
            } => Self::StartGame {
                code: require_code(lobby_code)?,
                player_id: require_player(player_id)?,
            },
            Request::SubmitAnswer {
                lobby_code,
                player_id,
                answer,
            } => Self::SubmitAnswer {
                code: require_code(lobby_code)?,
                player_id: require_player(player_id)?,
                answer,
            },
        })
    }
}

fn require_text(
    value: Option<String>,
    field: &'static str,
) -> Result<String, ProtocolError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProtocolError::MissingField(field)),
    }
}

fn require_player(value: Option<PlayerId>) -> Result<PlayerId, ProtocolError> {
    match value {
        Some(id) if !id.as_str().trim().is_empty() => Ok(id),
        _ => Err(ProtocolError::MissingField("playerId")),
    }
}

fn require_code(value: Option<LobbyCode>) -> Result<LobbyCode, ProtocolError> {
    match value {
        Some(code) if !code.as_str().is_empty() => Ok(code),
        _ => Err(ProtocolError::MissingField("lobbyCode")),
    }
}

// ---------------------------------------------------------------------------
// Response: what goes back
// ---------------------------------------------------------------------------

/// The reply to any request.
///
/// Success: `{ "success": true, "lobby": {...}, ... }`.
/// Failure: `{ "success": false, "code": 404, "error": "..." }`, where
/// `code` follows HTTP conventions (400, 403, 404, 500).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    /// Set only on `CreateLobby`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lobby_code: Option<LobbyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lobby: Option<LobbySnapshot>,
    /// Set only on `SubmitAnswer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<RoundResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// A plain success carrying the lobby snapshot.
    pub fn lobby(lobby: LobbySnapshot) -> Self {
        Self {
            success: true,
            lobby_code: None,
            lobby: Some(lobby),
            round_complete: None,
            results: None,
            code: None,
            error: None,
        }
    }

    /// Success for `CreateLobby`.
    pub fn created(code: LobbyCode, lobby: LobbySnapshot) -> Self {
        Self {
            lobby_code: Some(code),
            ..Self::lobby(lobby)
        }
    }

    /// Success for `SubmitAnswer`.
    pub fn submitted(
        lobby: LobbySnapshot,
        results: Option<RoundResult>,
    ) -> Self {
        Self {
            round_complete: Some(results.is_some()),
            results,
            ..Self::lobby(lobby)
        }
    }

    /// A failure with an HTTP-style status code.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            lobby_code: None,
            lobby: None,
            round_complete: None,
            results: None,
            code: Some(code),
            error: Some(message.into()),
        }
    }
}

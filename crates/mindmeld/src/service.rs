//! The lobby service: one async method per client operation.
//!
//! Every method takes the registry lock, runs one lobby operation to
//! completion against the registry clock, and returns a snapshot taken
//! under the same lock. Two requests for the same lobby can therefore
//! never interleave.

use mindmeld_lobby::{LobbyError, LobbyRegistry};
use mindmeld_protocol::{
    Command, LobbyAction, LobbyCode, LobbySnapshot, Millis, PlayerId,
    Response, RoundResult,
};
use tokio::sync::Mutex;

/// What a successful `submit_answer` reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub lobby: LobbySnapshot,
    /// `true` when this submission completed the round.
    pub round_complete: bool,
    /// The round result, present exactly when `round_complete` is.
    pub results: Option<RoundResult>,
}

/// Shared front door to the lobby registry.
#[derive(Debug)]
pub struct LobbyService {
    registry: Mutex<LobbyRegistry>,
}

impl LobbyService {
    pub fn new(registry: LobbyRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
        }
    }

    /// Runs a validated command and builds its success response.
    pub async fn execute(&self, command: Command) -> Result<Response, LobbyError> {
        match command {
            Command::CreateLobby {
                player_id,
                player_name,
            } => {
                let (code, lobby) = self.create_lobby(player_id, player_name).await?;
                Ok(Response::created(code, lobby))
            }
            Command::JoinLobby {
                code,
                player_id,
                player_name,
            } => self
                .join_lobby(&code, player_id, player_name)
                .await
                .map(Response::lobby),
            Command::UpdateLobby {
                code,
                player_id,
                action,
            } => self
                .update_lobby(&code, &player_id, action)
                .await
                .map(Response::lobby),
            Command::LobbyStatus { code, player_id } => self
                .lobby_status(&code, &player_id)
                .await
                .map(Response::lobby),
            Command::StartGame { code, player_id } => self
                .start_game(&code, &player_id)
                .await
                .map(Response::lobby),
            Command::SubmitAnswer {
                code,
                player_id,
                answer,
            } => {
                let outcome = self
                    .submit_answer(&code, &player_id, answer.as_deref())
                    .await?;
                Ok(Response::submitted(outcome.lobby, outcome.results))
            }
        }
    }

    /// Creates a lobby with the caller as host.
    pub async fn create_lobby(
        &self,
        player_id: PlayerId,
        player_name: String,
    ) -> Result<(LobbyCode, LobbySnapshot), LobbyError> {
        let player_name = required("playerName", player_name)?;
        let mut registry = self.registry.lock().await;
        let lobby = registry.create(player_id, player_name);
        Ok((lobby.code().clone(), lobby.snapshot()))
    }

    /// Adds the caller to a lobby, or refreshes their presence if they're
    /// already on it.
    pub async fn join_lobby(
        &self,
        code: &LobbyCode,
        player_id: PlayerId,
        player_name: String,
    ) -> Result<LobbySnapshot, LobbyError> {
        let player_name = required("playerName", player_name)?;
        let mut registry = self.registry.lock().await;
        let now = registry.now();
        let lobby = registry.get_mut(code)?;
        lobby.join(player_id, player_name, now)?;
        Ok(lobby.snapshot())
    }

    /// Applies a lobby action. Every action except `Heartbeat` is
    /// host-only.
    pub async fn update_lobby(
        &self,
        code: &LobbyCode,
        player_id: &PlayerId,
        action: LobbyAction,
    ) -> Result<LobbySnapshot, LobbyError> {
        let mut registry = self.registry.lock().await;
        let now = registry.now();
        let categories = registry.categories().clone();
        let lobby = registry.get_mut(code)?;

        tracing::debug!(%code, %player_id, action = action.name(), "update lobby");
        match action {
            LobbyAction::UpdateSettings(patch) => lobby.update_settings(player_id, patch)?,
            LobbyAction::AssignTeam {
                target_player_id,
                team,
            } => lobby.assign_team(player_id, &target_player_id, team)?,
            LobbyAction::Heartbeat => lobby.heartbeat(player_id, now)?,
            LobbyAction::NextRound => {
                lobby.next_round(player_id, categories.advance.as_ref(), now)?;
            }
        }
        Ok(lobby.snapshot())
    }

    /// The status poll. Also counts as a heartbeat.
    pub async fn lobby_status(
        &self,
        code: &LobbyCode,
        player_id: &PlayerId,
    ) -> Result<LobbySnapshot, LobbyError> {
        let mut registry = self.registry.lock().await;
        let now = registry.now();
        let lobby = registry.get_mut(code)?;
        lobby.status(player_id, now)?;
        Ok(lobby.snapshot())
    }

    /// Starts (or restarts) the game. Host only.
    pub async fn start_game(
        &self,
        code: &LobbyCode,
        player_id: &PlayerId,
    ) -> Result<LobbySnapshot, LobbyError> {
        let mut registry = self.registry.lock().await;
        let now = registry.now();
        let categories = registry.categories().clone();
        let lobby = registry.get_mut(code)?;
        lobby.start(player_id, categories.start.as_ref(), now)?;
        Ok(lobby.snapshot())
    }

    /// Records an answer for the current round.
    pub async fn submit_answer(
        &self,
        code: &LobbyCode,
        player_id: &PlayerId,
        answer: Option<&str>,
    ) -> Result<SubmitOutcome, LobbyError> {
        let mut registry = self.registry.lock().await;
        let now = registry.now();
        let lobby = registry.get_mut(code)?;
        let results = lobby.submit_answer(player_id, answer, now)?;
        Ok(SubmitOutcome {
            lobby: lobby.snapshot(),
            round_complete: results.is_some(),
            results,
        })
    }

    /// Marks a player disconnected in one lobby, unless they have been seen
    /// after `seen_at`. Returns `false` if nothing changed.
    pub async fn release_seat(
        &self,
        code: &LobbyCode,
        player_id: &PlayerId,
        seen_at: Millis,
    ) -> bool {
        let mut registry = self.registry.lock().await;
        match registry.get_mut(code) {
            Ok(lobby) => lobby.mark_disconnected_if_unseen(player_id, seen_at),
            Err(_) => false,
        }
    }

    /// Number of live lobbies.
    pub async fn lobby_count(&self) -> usize {
        self.registry.lock().await.len()
    }
}

fn required(field: &'static str, value: String) -> Result<String, LobbyError> {
    if value.trim().is_empty() {
        Err(LobbyError::Validation(format!("{field} is required")))
    } else {
        Ok(value)
    }
}

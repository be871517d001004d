//! A single lobby: roster, settings, and round state.
//!
//! Every public operation either applies completely or returns an error
//! having changed nothing. Checks always run before the first mutation.

use std::time::Duration;

use mindmeld_protocol::{
    LobbyCode, LobbySnapshot, Millis, Player, PlayerId, RoundResult, Settings,
    SettingsPatch,
};

use crate::{
    CategoryProvider, LobbyError, LobbyLimits, Presence, RoundPhase,
    RoundState,
};

/// One game lobby.
///
/// The host is fixed at creation and is always the first roster entry.
/// Players are never removed; leaving only clears their `connected` flag.
#[derive(Debug, Clone)]
pub struct LobbySession {
    code: LobbyCode,
    host_id: PlayerId,
    /// Roster in join order.
    players: Vec<Player>,
    settings: Settings,
    round: RoundState,
    limits: LobbyLimits,
    created_at: Millis,
}

impl LobbySession {
    /// Creates a lobby with `host_id` as its only (connected) player.
    pub fn new(
        code: LobbyCode,
        host_id: PlayerId,
        host_name: String,
        settings: Settings,
        limits: LobbyLimits,
        now: Millis,
    ) -> Self {
        let host = Player {
            id: host_id.clone(),
            name: host_name,
            is_host: true,
            team: None,
            connected: true,
            last_seen: now,
        };
        let mut round = RoundState::default();
        round.ensure_score(&host_id);

        Self {
            code,
            host_id,
            players: vec![host],
            settings,
            round,
            limits,
            created_at: now,
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn code(&self) -> &LobbyCode {
        &self.code
    }

    pub fn host_id(&self) -> &PlayerId {
        &self.host_id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    pub fn created_at(&self) -> Millis {
        self.created_at
    }

    /// `true` once the lobby is strictly older than `retention`.
    pub fn is_expired(&self, now: Millis, retention: Duration) -> bool {
        let retention_ms = retention.as_millis() as u64;
        self.created_at < now.saturating_sub(retention_ms)
    }

    /// Ids of every player currently marked connected, in roster order.
    pub fn connected_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.connected)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Players not seen for longer than `threshold`. Read-only; nobody is
    /// disconnected by this.
    pub fn idle_players(&self, now: Millis, threshold: Duration) -> Vec<&PlayerId> {
        self.players
            .iter()
            .filter(|p| p.idle_for(now) > threshold)
            .map(|p| &p.id)
            .collect()
    }

    fn member(&self, id: &PlayerId) -> Result<&Player, LobbyError> {
        self.player(id).ok_or_else(|| LobbyError::PlayerNotFound {
            code: self.code.clone(),
            player: id.clone(),
        })
    }

    fn member_mut(&mut self, id: &PlayerId) -> Result<&mut Player, LobbyError> {
        let code = &self.code;
        self.players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| LobbyError::PlayerNotFound {
                code: code.clone(),
                player: id.clone(),
            })
    }

    /// Fails unless `caller` is on the roster and is the host.
    fn require_host(
        &self,
        caller: &PlayerId,
        action: &'static str,
    ) -> Result<(), LobbyError> {
        if self.member(caller)?.is_host {
            Ok(())
        } else {
            Err(LobbyError::Forbidden(action))
        }
    }

    // -- Roster ------------------------------------------------------------

    /// Adds a player, or refreshes presence for one already on the roster.
    ///
    /// A rejoin never touches name, team or host status. Note that the
    /// capacity and in-progress checks run first, so even a rejoin is
    /// refused while a game is running or the roster is full.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        name: String,
        now: Millis,
    ) -> Result<(), LobbyError> {
        if !self.phase().is_joinable() {
            return Err(LobbyError::GameInProgress(self.code.clone()));
        }
        if self.players.len() >= self.limits.max_players {
            return Err(LobbyError::LobbyFull {
                code: self.code.clone(),
                max: self.limits.max_players,
            });
        }

        if let Ok(existing) = self.member_mut(&player_id) {
            existing.touch(now);
            tracing::info!(code = %self.code, %player_id, "player rejoined");
            return Ok(());
        }

        self.round.ensure_score(&player_id);
        self.players.push(Player {
            id: player_id.clone(),
            name,
            is_host: false,
            team: None,
            connected: true,
            last_seen: now,
        });
        tracing::info!(
            code = %self.code,
            %player_id,
            players = self.players.len(),
            "player joined"
        );
        Ok(())
    }

    /// Refreshes the caller's presence.
    pub fn heartbeat(&mut self, caller: &PlayerId, now: Millis) -> Result<(), LobbyError> {
        self.member_mut(caller)?.touch(now);
        Ok(())
    }

    /// The status-poll path: same presence refresh as a heartbeat.
    pub fn status(&mut self, caller: &PlayerId, now: Millis) -> Result<(), LobbyError> {
        self.heartbeat(caller, now)
    }

    /// Clears a player's connected flag. Returns `false` if they aren't
    /// on the roster.
    pub fn mark_disconnected(&mut self, player_id: &PlayerId) -> bool {
        match self.member_mut(player_id) {
            Ok(player) => {
                player.mark_disconnected();
                tracing::info!(code = %self.code, %player_id, "player disconnected");
                true
            }
            Err(_) => false,
        }
    }

    /// Marks a player disconnected unless they were seen after `seen_at`.
    ///
    /// Returns `false` for non-members and for players who have polled
    /// since then.
    pub fn mark_disconnected_if_unseen(
        &mut self,
        player_id: &PlayerId,
        seen_at: Millis,
    ) -> bool {
        let Some(last_seen) = self.player(player_id).map(|p| p.last_seen) else {
            return false;
        };
        if last_seen > seen_at {
            tracing::debug!(code = %self.code, %player_id, "seen since, staying connected");
            return false;
        }
        self.mark_disconnected(player_id)
    }

    // -- Host actions ------------------------------------------------------

    /// Merges `patch` into the settings. Values are not range-checked.
    pub fn update_settings(
        &mut self,
        caller: &PlayerId,
        patch: SettingsPatch,
    ) -> Result<(), LobbyError> {
        self.require_host(caller, "change settings")?;
        self.settings.apply(patch);
        tracing::debug!(code = %self.code, settings = ?self.settings, "settings updated");
        Ok(())
    }

    /// Puts `target` on `team` (or clears it with `None`). Unknown targets
    /// are ignored.
    pub fn assign_team(
        &mut self,
        caller: &PlayerId,
        target: &PlayerId,
        team: Option<String>,
    ) -> Result<(), LobbyError> {
        self.require_host(caller, "assign teams")?;
        if let Ok(player) = self.member_mut(target) {
            player.team = team;
        }
        Ok(())
    }

    /// Starts (or restarts) the game at round 1 and zeroes every score.
    pub fn start(
        &mut self,
        caller: &PlayerId,
        categories: &dyn CategoryProvider,
        now: Millis,
    ) -> Result<(), LobbyError> {
        self.require_host(caller, "start the game")?;
        if self.players.len() < self.limits.min_players {
            return Err(LobbyError::NotEnoughPlayers {
                have: self.players.len(),
                need: self.limits.min_players,
            });
        }

        let category = categories.next();
        self.round
            .start_game(self.players.iter().map(|p| &p.id), category, now);
        tracing::info!(
            code = %self.code,
            players = self.players.len(),
            category = self.round.current_category().unwrap_or_default(),
            "game started"
        );
        Ok(())
    }

    /// Opens the next round. Does nothing (and returns `false`) when no
    /// game is running.
    ///
    /// `total_rounds` is not enforced: stopping after the last round is
    /// up to the client.
    pub fn next_round(
        &mut self,
        caller: &PlayerId,
        categories: &dyn CategoryProvider,
        now: Millis,
    ) -> Result<bool, LobbyError> {
        self.require_host(caller, "advance the round")?;
        if !self.phase().is_active() {
            return Ok(false);
        }

        self.round.advance(categories.next(), now);
        tracing::info!(
            code = %self.code,
            round = self.round.current_round(),
            category = self.round.current_category().unwrap_or_default(),
            "next round"
        );
        Ok(true)
    }

    // -- Answers -----------------------------------------------------------

    /// Records the caller's answer and resolves the round if it's complete.
    ///
    /// Returns the round result when this submission completed the round.
    pub fn submit_answer(
        &mut self,
        caller: &PlayerId,
        answer: Option<&str>,
        now: Millis,
    ) -> Result<Option<RoundResult>, LobbyError> {
        self.member(caller)?;
        let connected = self.connected_players();

        let result = self.round.submit(
            &self.code,
            caller,
            answer,
            &self.settings,
            &connected,
            now,
        )?;

        match &result {
            Some(r) => tracing::info!(
                code = %self.code,
                round = self.round.current_round(),
                answer = %r.most_common_answer,
                matches = r.match_count,
                percentage = r.match_percentage,
                success = r.round_success,
                streak = r.streak,
                "round resolved"
            ),
            None => tracing::debug!(
                code = %self.code,
                player_id = %caller,
                answered = self.round.answers().len(),
                connected = connected.len(),
                "answer recorded"
            ),
        }
        Ok(result)
    }

    /// The wire form of this lobby.
    pub fn snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            code: self.code.clone(),
            host_id: self.host_id.clone(),
            players: self.players.clone(),
            settings: self.settings.clone(),
            game_state: self.round.snapshot(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedCategory;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn lobby() -> LobbySession {
        LobbySession::new(
            LobbyCode::new("TEST01"),
            pid("host"),
            "Hosty".into(),
            Settings::default(),
            LobbyLimits::default(),
            1_000,
        )
    }

    fn fixed() -> FixedCategory {
        FixedCategory("Tiere".into())
    }

    #[test]
    fn test_new_creates_connected_host_with_zero_score() {
        let lobby = lobby();
        assert_eq!(lobby.players().len(), 1);
        let host = &lobby.players()[0];
        assert!(host.is_host);
        assert!(host.connected);
        assert_eq!(host.last_seen, 1_000);
        assert_eq!(lobby.round().score(&pid("host")), Some(0));
        assert_eq!(lobby.round().current_round(), 0);
        assert_eq!(lobby.phase(), RoundPhase::Waiting);
    }

    #[test]
    fn test_mark_disconnected_if_unseen_skips_newer_poll() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        lobby.heartbeat(&pid("p2"), 5_000).unwrap();

        assert!(!lobby.mark_disconnected_if_unseen(&pid("p2"), 2_000));
        assert!(lobby.player(&pid("p2")).unwrap().connected);

        assert!(lobby.mark_disconnected_if_unseen(&pid("p2"), 5_000));
        assert!(!lobby.player(&pid("p2")).unwrap().connected);
        assert!(!lobby.mark_disconnected_if_unseen(&pid("ghost"), 5_000));
    }

    #[test]
    fn test_join_rejoin_refreshes_presence_only() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        lobby.assign_team(&pid("host"), &pid("p2"), Some("blue".into())).unwrap();
        lobby.mark_disconnected(&pid("p2"));

        lobby.join(pid("p2"), "Renamed".into(), 3_000).unwrap();

        assert_eq!(lobby.players().len(), 2);
        let p2 = lobby.player(&pid("p2")).unwrap();
        assert_eq!(p2.name, "Bo");
        assert_eq!(p2.team.as_deref(), Some("blue"));
        assert!(!p2.is_host);
        assert!(p2.connected);
        assert_eq!(p2.last_seen, 3_000);
    }

    #[test]
    fn test_join_host_rejoin_keeps_single_host() {
        let mut lobby = lobby();
        lobby.join(pid("host"), "Again".into(), 2_000).unwrap();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        assert_eq!(lobby.players().iter().filter(|p| p.is_host).count(), 1);
    }

    #[test]
    fn test_update_settings_non_host_forbidden() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        let err = lobby
            .update_settings(&pid("p2"), SettingsPatch::default())
            .unwrap_err();
        assert!(matches!(err, LobbyError::Forbidden(_)));
    }

    #[test]
    fn test_update_settings_unknown_caller_not_found() {
        let mut lobby = lobby();
        let err = lobby
            .update_settings(&pid("ghost"), SettingsPatch::default())
            .unwrap_err();
        assert!(matches!(err, LobbyError::PlayerNotFound { .. }));
    }

    #[test]
    fn test_assign_team_unknown_target_is_noop() {
        let mut lobby = lobby();
        let before = lobby.snapshot();
        lobby
            .assign_team(&pid("host"), &pid("ghost"), Some("red".into()))
            .unwrap();
        assert_eq!(lobby.snapshot(), before);
    }

    #[test]
    fn test_start_alone_not_enough_players() {
        let mut lobby = lobby();
        let err = lobby.start(&pid("host"), &fixed(), 2_000).unwrap_err();
        assert_eq!(err, LobbyError::NotEnoughPlayers { have: 1, need: 2 });
        assert!(!lobby.round().is_active());
    }

    #[test]
    fn test_start_non_host_forbidden() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        let err = lobby.start(&pid("p2"), &fixed(), 2_000).unwrap_err();
        assert!(matches!(err, LobbyError::Forbidden(_)));
    }

    #[test]
    fn test_next_round_inactive_is_noop() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        assert!(!lobby.next_round(&pid("host"), &fixed(), 3_000).unwrap());
        assert_eq!(lobby.round().current_round(), 0);
    }

    #[test]
    fn test_next_round_runs_past_total_rounds() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        lobby
            .update_settings(
                &pid("host"),
                SettingsPatch {
                    total_rounds: Some(1),
                    ..SettingsPatch::default()
                },
            )
            .unwrap();
        lobby.start(&pid("host"), &fixed(), 2_000).unwrap();

        assert!(lobby.next_round(&pid("host"), &fixed(), 3_000).unwrap());
        assert!(lobby.next_round(&pid("host"), &fixed(), 4_000).unwrap());
        assert_eq!(lobby.round().current_round(), 3);
    }

    #[test]
    fn test_submit_answer_unknown_player_not_found() {
        let mut lobby = lobby();
        let err = lobby.submit_answer(&pid("ghost"), Some("x"), 2_000).unwrap_err();
        assert!(matches!(err, LobbyError::PlayerNotFound { .. }));
    }

    #[test]
    fn test_submit_answer_does_not_touch_presence() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 2_000).unwrap();
        lobby.start(&pid("host"), &fixed(), 3_000).unwrap();

        lobby.submit_answer(&pid("p2"), Some("cat"), 4_000).unwrap();
        assert_eq!(lobby.player(&pid("p2")).unwrap().last_seen, 2_000);
    }

    #[test]
    fn test_idle_players_reports_without_disconnecting() {
        let mut lobby = lobby();
        lobby.join(pid("p2"), "Bo".into(), 50_000).unwrap();

        let idle = lobby.idle_players(61_000, Duration::from_secs(30));
        assert_eq!(idle, vec![&pid("host")]);
        assert!(lobby.player(&pid("host")).unwrap().connected);
    }

    #[test]
    fn test_is_expired_is_strict() {
        let lobby = lobby();
        let six_hours = Duration::from_secs(6 * 3600);
        assert!(!lobby.is_expired(1_000 + 21_600_000, six_hours));
        assert!(lobby.is_expired(1_000 + 21_600_001, six_hours));
    }

    #[test]
    fn test_snapshot_lists_players_in_join_order() {
        let mut lobby = lobby();
        lobby.join(pid("b"), "B".into(), 2_000).unwrap();
        lobby.join(pid("a"), "A".into(), 3_000).unwrap();

        let snap = lobby.snapshot();
        let ids: Vec<&str> = snap.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["host", "b", "a"]);
        assert_eq!(snap.host_id, pid("host"));
        assert_eq!(snap.game_state.scores.len(), 3);
    }
}

//! Lobby registry: creates, tracks, and expires lobbies.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use mindmeld_protocol::{LobbyCode, Millis, PlayerId};

use crate::{
    Categories, Clock, CodeGenerator, LobbyConfig, LobbyError, LobbySession,
    RandomCodes, SystemClock,
};

/// Owns every live lobby, keyed by code.
///
/// This is the entry point for lobby operations from the service layer.
/// It's a plain single-owner struct: the service wraps it in a mutex so
/// that each request runs as one atomic read-modify-write.
pub struct LobbyRegistry {
    lobbies: HashMap<LobbyCode, LobbySession>,
    config: LobbyConfig,
    clock: Arc<dyn Clock>,
    categories: Categories,
    codes: Box<dyn CodeGenerator>,
}

impl LobbyRegistry {
    /// Creates an empty registry on the system clock, with random codes
    /// and the built-in category catalogs.
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            lobbies: HashMap::new(),
            config,
            clock: Arc::new(SystemClock),
            categories: Categories::default(),
            codes: Box::new(RandomCodes::default()),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replaces the category providers.
    pub fn with_categories(mut self, categories: Categories) -> Self {
        self.categories = categories;
        self
    }

    /// Replaces the lobby code generator.
    pub fn with_code_generator(mut self, codes: impl CodeGenerator) -> Self {
        self.codes = Box::new(codes);
        self
    }

    /// The current time according to the registry's clock.
    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// The category providers. Cloning is cheap (two `Arc`s).
    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    /// Creates a lobby hosted by `host_id` and returns it.
    ///
    /// Sweeps expired lobbies first. A freshly generated code that is
    /// already in use replaces the old lobby.
    pub fn create(
        &mut self,
        host_id: PlayerId,
        host_name: String,
    ) -> &mut LobbySession {
        let now = self.now();
        self.sweep(now);

        let code = self.codes.generate();
        let session = LobbySession::new(
            code.clone(),
            host_id.clone(),
            host_name,
            self.config.default_settings.clone(),
            self.config.limits,
            now,
        );
        tracing::info!(%code, %host_id, "lobby created");

        match self.lobbies.entry(code) {
            Entry::Occupied(mut slot) => {
                tracing::warn!(code = %slot.key(), "lobby code collision, replacing");
                slot.insert(session);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(session),
        }
    }

    /// Looks a lobby up by code. Codes are case-insensitive.
    pub fn get(&self, code: &LobbyCode) -> Result<&LobbySession, LobbyError> {
        self.lobbies
            .get(code)
            .ok_or_else(|| LobbyError::LobbyNotFound(code.clone()))
    }

    /// Mutable lookup by code.
    pub fn get_mut(
        &mut self,
        code: &LobbyCode,
    ) -> Result<&mut LobbySession, LobbyError> {
        self.lobbies
            .get_mut(code)
            .ok_or_else(|| LobbyError::LobbyNotFound(code.clone()))
    }

    /// Drops every lobby created strictly more than the retention period
    /// before `now`. Returns how many were removed.
    pub fn sweep(&mut self, now: Millis) -> usize {
        let retention = self.config.retention;
        let before = self.lobbies.len();
        self.lobbies.retain(|code, lobby| {
            let keep = !lobby.is_expired(now, retention);
            if !keep {
                tracing::info!(%code, created_at = lobby.created_at(), "lobby expired");
            }
            keep
        });
        before - self.lobbies.len()
    }

    /// Marks `player_id` disconnected in every lobby they're on. Returns
    /// the number of lobbies touched.
    pub fn mark_disconnected(&mut self, player_id: &PlayerId) -> usize {
        self.lobbies
            .values_mut()
            .map(|lobby| lobby.mark_disconnected(player_id))
            .filter(|&touched| touched)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    /// Codes of every live lobby, in no particular order.
    pub fn codes(&self) -> Vec<LobbyCode> {
        self.lobbies.keys().cloned().collect()
    }
}

impl Default for LobbyRegistry {
    fn default() -> Self {
        Self::new(LobbyConfig::default())
    }
}

impl std::fmt::Debug for LobbyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LobbyRegistry")
            .field("lobbies", &self.lobbies.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::ManualClock;

    /// Hands out a scripted sequence of codes.
    struct ScriptedCodes(Mutex<Vec<&'static str>>);

    impl CodeGenerator for ScriptedCodes {
        fn generate(&self) -> LobbyCode {
            let mut codes = self.0.lock().unwrap();
            LobbyCode::new(codes.remove(0))
        }
    }

    fn registry(clock: &ManualClock, codes: &[&'static str]) -> LobbyRegistry {
        LobbyRegistry::default()
            .with_clock(clock.clone())
            .with_code_generator(ScriptedCodes(Mutex::new(codes.to_vec())))
    }

    #[test]
    fn test_create_registers_lobby_under_generated_code() {
        let clock = ManualClock::new(10_000);
        let mut reg = registry(&clock, &["ABC123"]);

        let lobby = reg.create(PlayerId::new("host"), "Hosty".into());
        assert_eq!(lobby.code().as_str(), "ABC123");
        assert_eq!(lobby.created_at(), 10_000);

        assert_eq!(reg.len(), 1);
        assert!(reg.get(&LobbyCode::new("abc123")).is_ok());
    }

    #[test]
    fn test_get_unknown_code_not_found() {
        let reg = LobbyRegistry::default();
        let err = reg.get(&LobbyCode::new("NOPE00")).unwrap_err();
        assert_eq!(err, LobbyError::LobbyNotFound(LobbyCode::new("NOPE00")));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_create_collision_replaces_existing() {
        let clock = ManualClock::new(0);
        let mut reg = registry(&clock, &["SAME01", "SAME01"]);

        reg.create(PlayerId::new("first"), "A".into());
        reg.create(PlayerId::new("second"), "B".into());

        assert_eq!(reg.len(), 1);
        let lobby = reg.get(&LobbyCode::new("SAME01")).unwrap();
        assert_eq!(lobby.host_id(), &PlayerId::new("second"));
    }

    #[test]
    fn test_sweep_drops_only_strictly_older_lobbies() {
        let clock = ManualClock::new(0);
        let mut reg = registry(&clock, &["OLD001", "NEW001"]);
        reg.create(PlayerId::new("a"), "A".into());
        clock.advance(Duration::from_secs(60));
        reg.create(PlayerId::new("b"), "B".into());

        let six_hours: Millis = 6 * 60 * 60 * 1000;
        assert_eq!(reg.sweep(six_hours), 0);
        assert_eq!(reg.sweep(six_hours + 1), 1);
        assert!(reg.get(&LobbyCode::new("OLD001")).is_err());
        assert!(reg.get(&LobbyCode::new("NEW001")).is_ok());
    }

    #[test]
    fn test_create_sweeps_expired_lobbies_first() {
        let clock = ManualClock::new(0);
        let mut reg = registry(&clock, &["OLD001", "NEW001"]);
        reg.create(PlayerId::new("a"), "A".into());

        clock.advance(Duration::from_secs(7 * 60 * 60));
        reg.create(PlayerId::new("b"), "B".into());

        assert_eq!(reg.codes(), vec![LobbyCode::new("NEW001")]);
    }

    #[test]
    fn test_mark_disconnected_across_lobbies() {
        let clock = ManualClock::new(0);
        let mut reg = registry(&clock, &["LOBBY1", "LOBBY2"]);
        reg.create(PlayerId::new("p"), "P".into());
        reg.create(PlayerId::new("q"), "Q".into())
            .join(PlayerId::new("p"), "P".into(), 0)
            .unwrap();

        assert_eq!(reg.mark_disconnected(&PlayerId::new("p")), 2);
        assert_eq!(reg.mark_disconnected(&PlayerId::new("nobody")), 0);
        let lobby = reg.get(&LobbyCode::new("LOBBY2")).unwrap();
        assert!(!lobby.player(&PlayerId::new("p")).unwrap().connected);
    }
}

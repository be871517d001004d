//! Server configuration.

use std::time::Duration;

use mindmeld_lobby::LobbyConfig;
use serde::{Deserialize, Serialize};

use crate::MindmeldError;

/// Environment variable holding the listen address.
pub const BIND_ENV: &str = "MINDMELD_BIND";

/// Environment variable holding the idle timeout, in whole seconds.
pub const IDLE_TIMEOUT_ENV: &str = "MINDMELD_IDLE_TIMEOUT_SECS";

/// Everything needed to start a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `"0.0.0.0:8080"`.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is closed. Clients
    /// poll every few seconds, so a minute of silence means they're gone.
    pub idle_timeout: Duration,

    pub lobby: LobbyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(60),
            lobby: LobbyConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, overridden by `MINDMELD_BIND` and
    /// `MINDMELD_IDLE_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self, MindmeldError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, MindmeldError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ENV) {
            let addr = addr.trim();
            if addr.is_empty() {
                return Err(MindmeldError::Config(format!("{BIND_ENV} is empty")));
            }
            config.bind_addr = addr.to_string();
        }

        if let Some(raw) = lookup(IDLE_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                MindmeldError::Config(format!(
                    "{IDLE_TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"
                ))
            })?;
            if secs == 0 {
                return Err(MindmeldError::Config(format!(
                    "{IDLE_TIMEOUT_ENV} must be greater than zero"
                )));
            }
            config.idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_empty_env_uses_defaults() {
        let config = ServerConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.lobby.limits.max_players, 8);
    }

    #[test]
    fn test_from_lookup_overrides_bind_and_timeout() {
        let config = ServerConfig::from_lookup(env(&[
            (BIND_ENV, "0.0.0.0:9000"),
            (IDLE_TIMEOUT_ENV, " 15 "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.idle_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_from_lookup_bad_timeout_is_config_error() {
        let err = ServerConfig::from_lookup(env(&[(IDLE_TIMEOUT_ENV, "soon")]))
            .unwrap_err();
        assert!(matches!(err, MindmeldError::Config(ref msg) if msg.contains("soon")));

        let err = ServerConfig::from_lookup(env(&[(IDLE_TIMEOUT_ENV, "0")]))
            .unwrap_err();
        assert!(matches!(err, MindmeldError::Config(_)));
    }

    #[test]
    fn test_from_lookup_blank_bind_is_config_error() {
        let err = ServerConfig::from_lookup(env(&[(BIND_ENV, "  ")])).unwrap_err();
        assert!(matches!(err, MindmeldError::Config(_)));
    }
}

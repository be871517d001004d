//! Player presence: the `connected` flag and `last_seen` timestamp.
//!
//! Presence lives on the [`Player`] record itself rather than in a
//! separate store. It is refreshed by create, join, heartbeat and status
//! polls. Submitting an answer does NOT refresh it.
//!
//! Nothing here ever flips a silent player to disconnected on a timer.
//! A player who stops polling keeps counting as connected, so they can
//! hold a round open until its time limit. Only an explicit
//! [`Presence::mark_disconnected`] clears the flag. The transport issues
//! one when a peer closes its connection or the socket fails, never when
//! the server drops a connection for being idle.

use std::time::Duration;

use mindmeld_protocol::{Millis, Player};

/// Presence bookkeeping on a roster entry.
pub trait Presence {
    /// Records a sign of life at `now`.
    fn touch(&mut self, now: Millis);

    /// Clears the connected flag. `last_seen` is kept.
    fn mark_disconnected(&mut self);

    /// How long since the player was last seen.
    fn idle_for(&self, now: Millis) -> Duration;
}

impl Presence for Player {
    fn touch(&mut self, now: Millis) {
        self.connected = true;
        self.last_seen = now;
    }

    fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    fn idle_for(&self, now: Millis) -> Duration {
        Duration::from_millis(now.saturating_sub(self.last_seen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmeld_protocol::PlayerId;

    fn player() -> Player {
        Player {
            id: PlayerId::new("p1"),
            name: "Ada".into(),
            is_host: false,
            team: Some("red".into()),
            connected: false,
            last_seen: 100,
        }
    }

    #[test]
    fn test_touch_sets_connected_and_last_seen() {
        let mut p = player();
        p.touch(5_000);
        assert!(p.connected);
        assert_eq!(p.last_seen, 5_000);
        assert_eq!(p.team.as_deref(), Some("red"));
    }

    #[test]
    fn test_mark_disconnected_keeps_last_seen() {
        let mut p = player();
        p.touch(5_000);
        p.mark_disconnected();
        assert!(!p.connected);
        assert_eq!(p.last_seen, 5_000);
    }

    #[test]
    fn test_idle_for_saturates_when_clock_is_behind() {
        let p = player();
        assert_eq!(p.idle_for(1_100), Duration::from_secs(1));
        assert_eq!(p.idle_for(0), Duration::ZERO);
    }
}

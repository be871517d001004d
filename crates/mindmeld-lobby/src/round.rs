//! The round engine: answer collection, completion, majority, scoring.
//!
//! A round is open from `start`/`next_round` until it resolves. There is
//! no timer: completion is checked synchronously on every submission, so
//! a round whose time ran out stays open until the next submission (which
//! is rejected as late) or until the host advances.
//!
//! ```text
//! submit ──→ late? ──yes──→ TimeExpired (nothing recorded)
//!              │no
//!              ▼
//!         record answer ──→ every connected player answered,
//!                           or time exactly up? ──yes──→ resolve
//! ```

use mindmeld_protocol::{
    LobbyCode, Millis, PlayerId, RoundResult, RoundSnapshot, Settings,
};

use crate::{LobbyError, RoundPhase};

/// Points per matching player for a successful round, multiplied by the
/// streak after that round.
const POINTS_PER_STREAK: u64 = 10;

/// Lower-cases and trims an answer. A missing answer becomes `""`.
pub fn normalize_answer(answer: Option<&str>) -> String {
    answer.unwrap_or_default().trim().to_lowercase()
}

/// Finds the most common non-empty answer.
///
/// Ties go to the answer that appears first in `answers`. Since answers
/// are kept in the order players first submitted, that is the tied
/// answer whose earliest submission came first. Returns `("", 0)` when
/// there are no non-empty answers.
pub fn majority(answers: &[(PlayerId, String)]) -> (String, u32) {
    // Answer lists are bounded by the roster size, so a linear scan
    // beats hashing here and keeps first-seen order for free.
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for (_, answer) in answers {
        if answer.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == answer.as_str()) {
            Some((_, count)) => *count += 1,
            None => counts.push((answer.as_str(), 1)),
        }
    }

    let mut best: (&str, u32) = ("", 0);
    for (answer, count) in counts {
        if count > best.1 {
            best = (answer, count);
        }
    }
    (best.0.to_string(), best.1)
}

/// `100 * matches / connected`, rounded half up. Zero connected players
/// yields 0.
///
/// The result can exceed 100: answers left behind by players who have
/// since disconnected still count as matches.
pub fn match_percentage(matches: u32, connected: usize) -> u32 {
    if connected == 0 {
        return 0;
    }
    let connected = connected as u64;
    ((200 * matches as u64 + connected) / (2 * connected)) as u32
}

// ---------------------------------------------------------------------------
// RoundState
// ---------------------------------------------------------------------------

/// Per-lobby game progress.
///
/// `answers` and `scores` are small ordered lists rather than maps: a
/// roster never exceeds a handful of players, and insertion order is part
/// of the observable behavior (snapshots, tie-breaks).
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    is_active: bool,
    current_round: u32,
    current_category: Option<String>,
    /// One entry per player per round. Replacing an answer keeps the
    /// player's original position.
    answers: Vec<(PlayerId, String)>,
    scores: Vec<(PlayerId, u64)>,
    streak: u32,
    round_start_time: Option<Millis>,
    last_result: Option<RoundResult>,
}

impl RoundState {
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// 0 before the first game starts.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn current_category(&self) -> Option<&str> {
        self.current_category.as_deref()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn round_start_time(&self) -> Option<Millis> {
        self.round_start_time
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn answers(&self) -> &[(PlayerId, String)] {
        &self.answers
    }

    pub fn answer(&self, player: &PlayerId) -> Option<&str> {
        self.answers
            .iter()
            .find(|(id, _)| id == player)
            .map(|(_, answer)| answer.as_str())
    }

    pub fn scores(&self) -> &[(PlayerId, u64)] {
        &self.scores
    }

    pub fn score(&self, player: &PlayerId) -> Option<u64> {
        self.scores
            .iter()
            .find(|(id, _)| id == player)
            .map(|(_, score)| *score)
    }

    pub fn phase(&self) -> RoundPhase {
        match (self.is_active, &self.last_result) {
            (false, _) => RoundPhase::Waiting,
            (true, None) => RoundPhase::Open,
            (true, Some(_)) => RoundPhase::Resolved,
        }
    }

    /// Milliseconds since the current round opened.
    pub fn elapsed_ms(&self, now: Millis) -> u64 {
        self.round_start_time
            .map(|start| now.saturating_sub(start))
            .unwrap_or(0)
    }

    // -- Transitions (driven by LobbySession) ------------------------------

    /// Gives a newly joined player a zero score, if they have none yet.
    pub(crate) fn ensure_score(&mut self, player: &PlayerId) {
        if self.score(player).is_none() {
            self.scores.push((player.clone(), 0));
        }
    }

    /// Starts (or restarts) a game at round 1. Every listed player's
    /// score is reset to 0.
    pub(crate) fn start_game<'a>(
        &mut self,
        roster: impl IntoIterator<Item = &'a PlayerId>,
        category: String,
        now: Millis,
    ) {
        for player in roster {
            self.ensure_score(player);
        }
        for (_, score) in &mut self.scores {
            *score = 0;
        }
        self.is_active = true;
        self.current_round = 1;
        self.streak = 0;
        self.open(category, now);
    }

    /// Moves to the next round. The streak and scores carry over.
    pub(crate) fn advance(&mut self, category: String, now: Millis) {
        self.current_round += 1;
        self.open(category, now);
    }

    fn open(&mut self, category: String, now: Millis) {
        self.current_category = Some(category);
        self.answers.clear();
        self.last_result = None;
        self.round_start_time = Some(now);
    }

    /// Records `player`'s answer, replacing any earlier one this round.
    pub(crate) fn record_answer(&mut self, player: &PlayerId, answer: String) {
        match self.answers.iter_mut().find(|(id, _)| id == player) {
            Some((_, existing)) => *existing = answer,
            None => self.answers.push((player.clone(), answer)),
        }
    }

    /// Accepts an answer and resolves the round if it is now complete.
    ///
    /// `connected` lists the players currently marked connected; only they
    /// must answer for the round to complete.
    ///
    /// # Errors
    /// - [`LobbyError::GameNotActive`] if no game is running.
    /// - [`LobbyError::TimeExpired`] if the round's time limit has passed.
    ///   The answer is dropped.
    pub(crate) fn submit(
        &mut self,
        code: &LobbyCode,
        player: &PlayerId,
        answer: Option<&str>,
        settings: &Settings,
        connected: &[PlayerId],
        now: Millis,
    ) -> Result<Option<RoundResult>, LobbyError> {
        if !self.is_active {
            return Err(LobbyError::GameNotActive(code.clone()));
        }

        let elapsed_ms = self.elapsed_ms(now);
        let limit_ms = u64::from(settings.round_time) * 1_000;
        if elapsed_ms > limit_ms {
            return Err(LobbyError::TimeExpired {
                elapsed_ms,
                limit_secs: settings.round_time,
            });
        }

        self.record_answer(player, normalize_answer(answer));

        let all_answered = connected.iter().all(|id| self.answer(id).is_some());
        if all_answered || elapsed_ms >= limit_ms {
            return Ok(Some(self.resolve(settings, connected.len())));
        }
        Ok(None)
    }

    /// Scores the current answers.
    ///
    /// On success the streak grows by one and every player whose answer
    /// equals the majority answer earns `10 * streak`. On failure the
    /// streak resets and nobody scores.
    pub(crate) fn resolve(
        &mut self,
        settings: &Settings,
        connected: usize,
    ) -> RoundResult {
        let (most_common_answer, match_count) = majority(&self.answers);
        let match_percentage = match_percentage(match_count, connected);
        let round_success = match_percentage >= settings.match_threshold;

        if round_success {
            self.streak += 1;
            let points = POINTS_PER_STREAK * u64::from(self.streak);
            let winners: Vec<PlayerId> = self
                .answers
                .iter()
                .filter(|(_, answer)| *answer == most_common_answer)
                .map(|(id, _)| id.clone())
                .collect();
            for player in &winners {
                self.add_points(player, points);
            }
        } else {
            self.streak = 0;
        }

        let result = RoundResult {
            most_common_answer,
            match_count,
            match_percentage,
            round_success,
            streak: self.streak,
            all_answers: self.answers.clone(),
        };
        self.last_result = Some(result.clone());
        result
    }

    fn add_points(&mut self, player: &PlayerId, points: u64) {
        match self.scores.iter_mut().find(|(id, _)| id == player) {
            Some((_, score)) => *score += points,
            None => self.scores.push((player.clone(), points)),
        }
    }

    /// The wire form of this state.
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            is_active: self.is_active,
            current_round: self.current_round,
            current_category: self.current_category.clone(),
            round_answers: self.answers.clone(),
            scores: self.scores.clone(),
            streak: self.streak,
            round_start_time: self.round_start_time,
            last_result: self.last_result.clone(),
        }
    }
}

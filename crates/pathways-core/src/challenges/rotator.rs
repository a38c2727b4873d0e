//! Challenge rotation engine.
//!
//! Owns [`ChallengeState`] and decides which challenges are active, when
//! period counters reset and which active challenges are satisfied. It never
//! touches [`UserProgress`](crate::progress::UserProgress): completed
//! challenges are returned to the caller, which pays out XP through the
//! progress engine.
//!
//! ## Period rollover
//!
//! ```text
//! new day  -> drop resetting daily completions -> clear daily counters -> redraw dailies
//! new week -> drop resetting weekly completions -> clear weekly counters -> redraw weeklies
//! ```

use chrono::NaiveDate;
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::Serialize;

use super::catalog::{catalog, find_challenge, Challenge, ChallengeKind};
use super::counters::{ActivityKind, ProgressSnapshot};
use super::state::ChallengeState;
use crate::clock::{day_key, WeekStart};
use crate::error::{Result, ValidationError};

/// Rotation knobs taken from the `[challenges]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSettings {
    pub daily_count: usize,
    pub weekly_count: usize,
    /// Fixed seed for reproducible draws; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            daily_count: 3,
            weekly_count: 2,
            seed: None,
        }
    }
}

/// Which periods rolled over or were redrawn by a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rollover {
    pub daily: bool,
    pub weekly: bool,
}

impl Rollover {
    pub fn any(&self) -> bool {
        self.daily || self.weekly
    }

    fn merge(self, other: Rollover) -> Rollover {
        Rollover {
            daily: self.daily || other.daily,
            weekly: self.weekly || other.weekly,
        }
    }
}

/// An active challenge as shown to the learner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChallenge {
    #[serde(flatten)]
    pub challenge: &'static Challenge,
    pub is_completed: bool,
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStats {
    pub total_completed: usize,
    pub daily_completed: usize,
    pub weekly_completed: usize,
    pub active_challenges: usize,
}

pub struct ChallengeRotator {
    state: ChallengeState,
    week_start: WeekStart,
    settings: RotationSettings,
    rng: Mcg128Xsl64,
}

impl ChallengeRotator {
    pub fn new(state: ChallengeState, week_start: WeekStart, settings: RotationSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            state,
            week_start,
            settings,
            rng,
        }
    }

    pub fn state(&self) -> &ChallengeState {
        &self.state
    }

    /// Swap in a whole state (import/reset).
    pub fn replace_state(&mut self, state: ChallengeState) {
        self.state = state;
    }

    // ── Rollover ─────────────────────────────────────────────────────

    /// Reset whichever periods changed since the last call, then make sure
    /// each kind has an active draw.
    pub fn check_resets(&mut self, today: NaiveDate) -> Rollover {
        let mut rolled = Rollover::default();

        if self.state.last_reset_date != today {
            self.reset_daily();
            self.state.last_reset_date = today;
            rolled.daily = true;
        }

        let anchor = self.week_start.anchor(today);
        if self.state.last_week_reset_date != anchor {
            self.reset_weekly();
            self.state.last_week_reset_date = anchor;
            rolled.weekly = true;
        }

        rolled.merge(self.ensure_active())
    }

    /// Draw a kind only when nothing of that kind is active.
    pub fn ensure_active(&mut self) -> Rollover {
        let mut drawn = Rollover::default();
        if !self.has_active(ChallengeKind::Daily) {
            self.generate_daily();
            drawn.daily = true;
        }
        if !self.has_active(ChallengeKind::Weekly) {
            self.generate_weekly();
            drawn.weekly = true;
        }
        drawn
    }

    fn reset_daily(&mut self) {
        // Unknown ids are dropped along with resetting ones.
        self.state
            .completed_challenges
            .retain(|id| find_challenge(id).is_some_and(|c| !c.reset_daily));
        self.state.daily_progress.clear();
        self.generate_daily();
        tracing::debug!(active = ?self.state.active_challenges, "daily challenges rotated");
    }

    fn reset_weekly(&mut self) {
        self.state
            .completed_challenges
            .retain(|id| find_challenge(id).is_some_and(|c| !c.reset_weekly));
        self.state.active_challenges.retain(|id| {
            find_challenge(id).is_some_and(|c| c.kind != ChallengeKind::Weekly || !c.reset_weekly)
        });
        self.state.weekly_progress.clear();
        self.generate_weekly();
        tracing::debug!(active = ?self.state.active_challenges, "weekly challenges rotated");
    }

    /// Replace active dailies with a fresh draw; weekly ids stay.
    pub fn generate_daily(&mut self) {
        self.state
            .active_challenges
            .retain(|id| find_challenge(id).is_some_and(|c| c.kind == ChallengeKind::Weekly));
        let drawn = self.draw(ChallengeKind::Daily, self.settings.daily_count);
        self.state.active_challenges.extend(drawn);
    }

    /// Add a weekly draw to the active set.
    pub fn generate_weekly(&mut self) {
        let drawn = self.draw(ChallengeKind::Weekly, self.settings.weekly_count);
        self.state.active_challenges.extend(drawn);
    }

    /// Uniform sample of up to `count` not-yet-completed ids of `kind`.
    fn draw(&mut self, kind: ChallengeKind, count: usize) -> Vec<String> {
        let mut pool: Vec<&'static Challenge> = catalog(kind)
            .iter()
            .filter(|c| !self.state.completed_challenges.contains(c.id))
            .collect();
        pool.shuffle(&mut self.rng);
        pool.into_iter()
            .take(count)
            .map(|c| c.id.to_string())
            .collect()
    }

    fn has_active(&self, kind: ChallengeKind) -> bool {
        self.state
            .active_challenges
            .iter()
            .any(|id| find_challenge(id).is_some_and(|c| c.kind == kind))
    }

    // ── Progress ─────────────────────────────────────────────────────

    /// Add `amount` to the counters `kind` touches and complete any active
    /// challenge that is now satisfied. Returns the newly completed ones.
    pub fn update_progress(
        &mut self,
        kind: ActivityKind,
        amount: u64,
        current_streak: u32,
        today: NaiveDate,
    ) -> Result<Vec<&'static Challenge>> {
        if amount == 0 {
            return Err(ValidationError::InvalidAmount {
                field: kind.as_str().into(),
                value: amount,
            }
            .into());
        }

        let week_key = day_key(self.week_start.anchor(today));
        self.state
            .daily_progress
            .entry(day_key(today))
            .or_default()
            .apply(kind, amount);
        self.state
            .weekly_progress
            .entry(week_key)
            .or_default()
            .apply(kind, amount);
        tracing::debug!(activity = %kind, amount, "challenge counters updated");

        Ok(self.evaluate(current_streak, today))
    }

    /// Complete every active, unfinished challenge whose goals hold.
    pub fn evaluate(&mut self, current_streak: u32, today: NaiveDate) -> Vec<&'static Challenge> {
        let snapshot = self.snapshot(current_streak, today);
        let satisfied: Vec<&'static Challenge> = self
            .active_definitions()
            .filter(|c| !self.state.completed_challenges.contains(c.id) && c.is_met(&snapshot))
            .collect();
        for challenge in &satisfied {
            self.complete(challenge.id);
        }
        satisfied
    }

    /// Mark a challenge completed for the current period. False if it
    /// already was.
    pub fn complete(&mut self, challenge_id: &str) -> bool {
        self.state
            .completed_challenges
            .insert(challenge_id.to_string())
    }

    /// Today's counters merged with this week's and the live streak.
    pub fn snapshot(&self, current_streak: u32, today: NaiveDate) -> ProgressSnapshot {
        let week_key = day_key(self.week_start.anchor(today));
        ProgressSnapshot {
            daily: self
                .state
                .daily_progress
                .get(&day_key(today))
                .copied()
                .unwrap_or_default(),
            weekly: self
                .state
                .weekly_progress
                .get(&week_key)
                .copied()
                .unwrap_or_default(),
            current_streak,
        }
    }

    /// Key recorded in the learner's completed set: qualified by the period
    /// the challenge resets with, bare for non-resetting challenges.
    pub fn completion_key(&self, challenge: &Challenge, today: NaiveDate) -> String {
        if challenge.reset_daily {
            format!("{}@{}", challenge.id, day_key(today))
        } else if challenge.reset_weekly {
            format!("{}@{}", challenge.id, day_key(self.week_start.anchor(today)))
        } else {
            challenge.id.to_string()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Active definitions in catalog order, dailies first.
    fn active_definitions(&self) -> impl Iterator<Item = &'static Challenge> + '_ {
        catalog(ChallengeKind::Daily)
            .iter()
            .chain(catalog(ChallengeKind::Weekly))
            .filter(|c| self.state.active_challenges.contains(c.id))
    }

    pub fn active_challenges(&self, current_streak: u32, today: NaiveDate) -> Vec<ActiveChallenge> {
        let snapshot = self.snapshot(current_streak, today);
        self.active_definitions()
            .map(|challenge| ActiveChallenge {
                challenge,
                is_completed: self.state.completed_challenges.contains(challenge.id),
                progress: challenge.percent(&snapshot),
            })
            .collect()
    }

    /// Percentage toward `challenge_id`, `None` for unknown ids.
    pub fn challenge_progress(
        &self,
        challenge_id: &str,
        current_streak: u32,
        today: NaiveDate,
    ) -> Option<f64> {
        let challenge = find_challenge(challenge_id)?;
        Some(challenge.percent(&self.snapshot(current_streak, today)))
    }

    pub fn is_completed(&self, challenge_id: &str) -> bool {
        self.state.completed_challenges.contains(challenge_id)
    }

    pub fn stats(&self) -> ChallengeStats {
        let completed_of = |kind| {
            self.state
                .completed_challenges
                .iter()
                .filter(|id| find_challenge(id).is_some_and(|c| c.kind == kind))
                .count()
        };
        ChallengeStats {
            total_completed: self.state.completed_challenges.len(),
            daily_completed: completed_of(ChallengeKind::Daily),
            weekly_completed: completed_of(ChallengeKind::Weekly),
            active_challenges: self.state.active_challenges.len(),
        }
    }
}

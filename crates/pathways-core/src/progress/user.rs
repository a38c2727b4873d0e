//! Per-device learner progress record.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::levels::level_for_xp;

/// Badge identifier as stored in [`UserProgress::badges`].
pub type BadgeId = String;
/// Challenge completion key as stored in [`UserProgress::challenges_completed`].
///
/// Resetting challenges are keyed `id@YYYY-MM-DD` (the day, or the week
/// anchor for weeklies), so each period's completion is its own entry. The
/// set is a history: it is never pruned, grows by at most the active draw per
/// period, and its size is what the `challenge_champion` badge counts.
pub type ChallengeId = String;

/// Notification and celebration switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub show_notifications: bool,
    pub streak_reminders: bool,
    pub celebrate_achievements: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            show_notifications: true,
            streak_reminders: true,
            celebrate_achievements: true,
        }
    }
}

/// Everything the progress engine tracks for the learner.
///
/// Only [`ProgressEngine`](super::ProgressEngine) mutates this; everyone
/// else reads a shared reference or a cloned snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub xp: u64,
    /// Derived from `xp`; recomputed on load and after every award.
    pub level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub badges: BTreeSet<BadgeId>,
    #[serde(rename = "weeklyXP")]
    pub weekly_xp: u64,
    /// Anchor date of the weekly window `weekly_xp` belongs to.
    pub week_start_date: NaiveDate,
    pub challenges_completed: BTreeSet<ChallengeId>,
    pub weekly_goal: u64,
    pub total_lessons_completed: u32,
    pub total_reading_completed: u32,
    pub total_writing_completed: u32,
    pub perfect_scores: u32,
    pub preferences: Preferences,
}

impl UserProgress {
    /// Fresh progress for a first launch.
    pub fn new(week_start_date: NaiveDate, weekly_goal: u64, preferences: Preferences) -> Self {
        Self {
            xp: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            badges: BTreeSet::new(),
            weekly_xp: 0,
            week_start_date,
            challenges_completed: BTreeSet::new(),
            weekly_goal: weekly_goal.max(1),
            total_lessons_completed: 0,
            total_reading_completed: 0,
            total_writing_completed: 0,
            perfect_scores: 0,
            preferences,
        }
    }

    /// Restore derived fields and bounds after loading or importing.
    pub(crate) fn normalize(&mut self, fallback_weekly_goal: u64) {
        self.level = level_for_xp(self.xp);
        self.longest_streak = self.longest_streak.max(self.current_streak);
        if self.weekly_goal == 0 {
            self.weekly_goal = fallback_weekly_goal.max(1);
        }
    }

    /// The longer of the live streak and the best streak so far.
    pub fn best_streak(&self) -> u32 {
        self.current_streak.max(self.longest_streak)
    }
}

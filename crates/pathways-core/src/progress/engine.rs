//! Progress engine implementation.
//!
//! The engine is the only writer of [`UserProgress`]. It takes today's date
//! as an argument on every call instead of reading a clock, so the caller
//! decides what "today" means. Side effects are queued as [`Event`]s and
//! handed out by [`ProgressEngine::drain_events`].
//!
//! ## Award flow
//!
//! ```text
//! roll weekly window -> add XP -> advance streak (maybe milestone bonus)
//!                    -> report net level transition
//! ```
//!
//! Inside a batch (`begin_batch` .. `end_batch`) level transitions are held
//! back and reported once when the batch ends.

use chrono::NaiveDate;
use serde::Serialize;

use super::levels::{level_for_xp, progress_to_next_level, xp_for_next_level};
use super::rewards::{
    streak_milestone_bonus, CHALLENGE_XP, LESSON_XP, PERFECT_SCORE_BONUS, READING_XP, WRITING_XP,
};
use super::user::{Preferences, UserProgress};
use crate::clock::{days_between, WeekStart};
use crate::error::{Result, ValidationError};
use crate::events::{Event, NotificationKind};
use crate::locale::Locale;

/// Outcome of a single XP award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub xp_awarded: u64,
    pub total_xp: u64,
    pub level_up: bool,
    pub new_level: u32,
    pub activity: String,
}

/// What recording an activity did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakUpdate {
    /// Already active today.
    SameDay,
    /// First recorded activity ever.
    Started,
    /// Activity on the day after the last one.
    Continued {
        streak: u32,
        milestone_bonus: Option<u64>,
    },
    /// A gap of two or more days; streak restarts at 1.
    Restarted { previous: u32 },
    /// Today is before the last activity date; nothing changes.
    ClockSkew,
}

pub struct ProgressEngine {
    user: UserProgress,
    week_start: WeekStart,
    locale: Locale,
    default_weekly_goal: u64,
    events: Vec<Event>,
    /// Level when the open batch started; level-ups inside it are reported
    /// once, by `end_batch`.
    batch_start_level: Option<u32>,
}

impl ProgressEngine {
    /// Wrap loaded progress, repairing derived fields.
    pub fn new(
        mut user: UserProgress,
        week_start: WeekStart,
        locale: Locale,
        default_weekly_goal: u64,
    ) -> Self {
        user.normalize(default_weekly_goal);
        Self {
            user,
            week_start,
            locale,
            default_weekly_goal,
            events: Vec::new(),
            batch_start_level: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn user(&self) -> &UserProgress {
        &self.user
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn xp_for_next_level(&self) -> Option<u64> {
        xp_for_next_level(self.user.xp)
    }

    pub fn progress_to_next_level(&self) -> f64 {
        progress_to_next_level(self.user.xp)
    }

    /// Take queued side-effect events, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ── Batches ──────────────────────────────────────────────────────

    /// Start grouping awards: until [`end_batch`](Self::end_batch), level
    /// changes are not reported per award.
    pub fn begin_batch(&mut self) {
        self.batch_start_level = Some(self.user.level);
    }

    /// Whether the level rose since the open batch started.
    pub fn leveled_up_in_batch(&self) -> bool {
        self.batch_start_level
            .is_some_and(|start| self.user.level > start)
    }

    /// Close the batch and report its net level transition, if any.
    pub fn end_batch(&mut self) -> bool {
        match self.batch_start_level.take() {
            Some(start) => self.report_level_change(start),
            None => false,
        }
    }

    // ── Period bookkeeping ───────────────────────────────────────────

    /// Reset weekly XP when today's week anchor differs from the stored one.
    pub fn roll_weekly_window(&mut self, today: NaiveDate) -> bool {
        let anchor = self.week_start.anchor(today);
        if anchor == self.user.week_start_date {
            return false;
        }
        let previous_weekly_xp = self.user.weekly_xp;
        tracing::debug!(%anchor, previous_weekly_xp, "weekly XP window rolled over");
        self.user.weekly_xp = 0;
        self.user.week_start_date = anchor;
        self.events.push(Event::WeeklyWindowReset {
            week_start: anchor,
            previous_weekly_xp,
        });
        true
    }

    /// Zero the live streak if the last activity is older than yesterday.
    pub fn refresh_streak(&mut self, today: NaiveDate) -> bool {
        let Some(last) = self.user.last_activity_date else {
            return false;
        };
        if days_between(last, today) <= 1 || self.user.current_streak == 0 {
            return false;
        }
        let previous_streak = self.user.current_streak;
        tracing::debug!(previous_streak, %last, "streak broken");
        self.user.current_streak = 0;
        self.events.push(Event::StreakBroken { previous_streak });
        true
    }

    // ── Awards ───────────────────────────────────────────────────────

    /// Award `amount` XP for `activity`. Zero is rejected.
    pub fn award_xp(&mut self, amount: u64, activity: &str, today: NaiveDate) -> Result<XpAward> {
        if amount == 0 {
            return Err(ValidationError::InvalidAmount {
                field: "xp".into(),
                value: amount,
            }
            .into());
        }
        Ok(self.grant(amount, activity.to_string(), today))
    }

    /// Record today as an active day and advance the streak.
    pub fn record_activity(&mut self, today: NaiveDate) -> StreakUpdate {
        let previous_level = self.user.level;
        let update = self.advance_streak(today);
        self.report_level_change(previous_level);
        update
    }

    pub fn complete_lesson(&mut self, perfect: bool, today: NaiveDate) -> XpAward {
        let mut xp = LESSON_XP;
        let mut activity = String::from("Daily lesson");
        if perfect {
            xp += PERFECT_SCORE_BONUS;
            activity.push_str(", Perfect score bonus");
            self.user.perfect_scores += 1;
        }
        self.user.total_lessons_completed += 1;
        self.grant(xp, activity, today)
    }

    pub fn complete_reading(&mut self, today: NaiveDate) -> XpAward {
        self.user.total_reading_completed += 1;
        self.grant(READING_XP, "Reading exercise".into(), today)
    }

    pub fn complete_writing(&mut self, today: NaiveDate) -> XpAward {
        self.user.total_writing_completed += 1;
        self.grant(WRITING_XP, "Writing exercise".into(), today)
    }

    /// Record a completed challenge and pay the fixed challenge XP.
    ///
    /// Returns `None` if `challenge_id` was already recorded.
    pub fn complete_challenge(&mut self, challenge_id: &str, today: NaiveDate) -> Option<XpAward> {
        if !self.user.challenges_completed.insert(challenge_id.to_string()) {
            tracing::debug!(challenge_id, "challenge already completed");
            return None;
        }
        Some(self.grant(CHALLENGE_XP, format!("Challenge: {challenge_id}"), today))
    }

    /// Mark a badge as earned. Returns false if it already was.
    pub fn award_badge(&mut self, badge_id: &str, display_name: &str) -> bool {
        if !self.user.badges.insert(badge_id.to_string()) {
            return false;
        }
        tracing::debug!(badge_id, "badge awarded");
        self.events.push(Event::BadgeAwarded {
            badge_id: badge_id.to_string(),
        });
        if self.user.preferences.celebrate_achievements {
            let message = match self.locale {
                Locale::En => format!("🏆 New Badge Earned: {display_name}!"),
                Locale::Zh => format!("🏆 获得新徽章：{display_name}！"),
            };
            self.notify(NotificationKind::Achievement, message);
        }
        true
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn set_weekly_goal(&mut self, goal: u64) -> Result<()> {
        if goal == 0 {
            return Err(ValidationError::InvalidAmount {
                field: "weekly_goal".into(),
                value: goal,
            }
            .into());
        }
        self.user.weekly_goal = goal;
        Ok(())
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.user.preferences = preferences;
    }

    /// Swap in a whole record (import/reset), repairing derived fields.
    pub fn replace_user(&mut self, mut user: UserProgress) {
        user.normalize(self.default_weekly_goal);
        self.user = user;
        self.events.clear();
    }

    // ── Internals ────────────────────────────────────────────────────

    fn grant(&mut self, amount: u64, activity: String, today: NaiveDate) -> XpAward {
        self.roll_weekly_window(today);
        let previous_level = self.user.level;
        self.add_xp(amount);
        self.advance_streak(today);
        let level_up = self.report_level_change(previous_level);
        XpAward {
            xp_awarded: amount,
            total_xp: self.user.xp,
            level_up,
            new_level: self.user.level,
            activity,
        }
    }

    fn add_xp(&mut self, amount: u64) {
        self.user.xp = self.user.xp.saturating_add(amount);
        self.user.weekly_xp = self.user.weekly_xp.saturating_add(amount);
        self.user.level = level_for_xp(self.user.xp);
    }

    fn advance_streak(&mut self, today: NaiveDate) -> StreakUpdate {
        let Some(last) = self.user.last_activity_date else {
            self.user.current_streak = 1;
            self.user.longest_streak = self.user.longest_streak.max(1);
            self.user.last_activity_date = Some(today);
            return StreakUpdate::Started;
        };

        let gap = days_between(last, today);
        if gap == 0 {
            return StreakUpdate::SameDay;
        }
        if gap < 0 {
            tracing::warn!(%last, %today, "clock is behind last activity date");
            return StreakUpdate::ClockSkew;
        }

        // Written before milestone processing so nothing re-enters this day.
        self.user.last_activity_date = Some(today);

        if gap > 1 {
            let previous = self.user.current_streak;
            self.user.current_streak = 1;
            self.user.longest_streak = self.user.longest_streak.max(1);
            tracing::debug!(previous, gap, "streak restarted");
            return StreakUpdate::Restarted { previous };
        }

        self.user.current_streak += 1;
        let streak = self.user.current_streak;
        self.user.longest_streak = self.user.longest_streak.max(streak);

        let milestone_bonus = streak_milestone_bonus(streak);
        if let Some(bonus_xp) = milestone_bonus {
            self.add_xp(bonus_xp);
            tracing::debug!(streak, bonus_xp, "streak milestone reached");
            self.events.push(Event::StreakMilestone { streak, bonus_xp });
            if self.user.preferences.celebrate_achievements {
                let message = match self.locale {
                    Locale::En => format!("🔥 Amazing! {streak}-day learning streak!"),
                    Locale::Zh => format!("🔥 太棒了！连续学习{streak}天！"),
                };
                self.notify(NotificationKind::Success, message);
            }
        }

        StreakUpdate::Continued {
            streak,
            milestone_bonus,
        }
    }

    fn report_level_change(&mut self, previous_level: u32) -> bool {
        let new_level = self.user.level;
        if new_level <= previous_level {
            return false;
        }
        if self.batch_start_level.is_some() {
            return true;
        }
        tracing::debug!(previous_level, new_level, "level up");
        self.events.push(Event::LevelUp {
            previous_level,
            new_level,
            total_xp: self.user.xp,
        });
        if self.user.preferences.celebrate_achievements {
            let message = match self.locale {
                Locale::En => format!("🎉 Level Up! You reached Level {new_level}!"),
                Locale::Zh => format!("🎉 升级！你达到了第{new_level}级！"),
            };
            self.notify(NotificationKind::Success, message);
        }
        true
    }

    fn notify(&mut self, kind: NotificationKind, message: String) {
        self.events.push(Event::Notification { kind, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        // 2026-10-12 is a Monday
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap() + Duration::days(offset)
    }

    fn engine_with(customize: impl FnOnce(&mut UserProgress)) -> ProgressEngine {
        let mut user = UserProgress::new(
            WeekStart::Sunday.anchor(day(0)),
            300,
            Preferences::default(),
        );
        customize(&mut user);
        ProgressEngine::new(user, WeekStart::Sunday, Locale::En, 300)
    }

    fn fresh() -> ProgressEngine {
        engine_with(|_| {})
    }

    #[test]
    fn perfect_lesson_on_fresh_user() {
        let mut engine = fresh();
        let award = engine.complete_lesson(true, day(0));

        let user = engine.user();
        assert_eq!(user.xp, 35);
        assert_eq!(user.level, 1);
        assert_eq!(user.perfect_scores, 1);
        assert_eq!(user.total_lessons_completed, 1);
        assert_eq!(user.current_streak, 1);
        assert_eq!(user.longest_streak, 1);
        assert!(!award.level_up);
        assert_eq!(award.xp_awarded, 35);
    }

    #[test]
    fn lesson_crossing_level_two() {
        let mut engine = engine_with(|u| u.xp = 90);
        let award = engine.complete_lesson(false, day(0));

        assert_eq!(award.total_xp, 115);
        assert!(award.level_up);
        assert_eq!(award.new_level, 2);
        assert_eq!(engine.user().level, 2);

        let events = engine.drain_events();
        assert!(events.contains(&Event::LevelUp {
            previous_level: 1,
            new_level: 2,
            total_xp: 115,
        }));
    }

    #[test]
    fn multiple_thresholds_report_one_net_transition() {
        let mut engine = fresh();
        let award = engine.award_xp(1200, "import bonus", day(0)).unwrap();
        assert_eq!(award.new_level, 5);

        let level_ups: Vec<_> = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Event::LevelUp { .. }))
            .collect();
        assert_eq!(
            level_ups,
            vec![Event::LevelUp {
                previous_level: 1,
                new_level: 5,
                total_xp: 1200,
            }]
        );
    }

    #[test]
    fn zero_xp_is_rejected() {
        let mut engine = fresh();
        let err = engine.award_xp(0, "nothing", day(0)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidAmount { value: 0, .. })
        ));
        assert_eq!(engine.user().xp, 0);
        assert_eq!(engine.user().last_activity_date, None);
    }

    #[test]
    fn consecutive_day_extends_streak() {
        let mut engine = fresh();
        engine.complete_reading(day(0));
        engine.complete_reading(day(1));
        assert_eq!(engine.user().current_streak, 2);
        assert_eq!(engine.user().longest_streak, 2);
    }

    #[test]
    fn gap_of_three_days_restarts_streak() {
        let mut engine = engine_with(|u| {
            u.current_streak = 4;
            u.longest_streak = 4;
            u.last_activity_date = Some(day(0));
        });
        let update = engine.record_activity(day(3));
        assert_eq!(update, StreakUpdate::Restarted { previous: 4 });
        assert_eq!(engine.user().current_streak, 1);
        assert_eq!(engine.user().longest_streak, 4);
    }

    #[test]
    fn same_day_activity_is_noop() {
        let mut engine = engine_with(|u| {
            u.current_streak = 3;
            u.longest_streak = 3;
            u.last_activity_date = Some(day(0));
        });
        assert_eq!(engine.record_activity(day(0)), StreakUpdate::SameDay);
        assert_eq!(engine.user().current_streak, 3);
    }

    #[test]
    fn clock_skew_keeps_state() {
        let mut engine = engine_with(|u| {
            u.current_streak = 3;
            u.longest_streak = 3;
            u.last_activity_date = Some(day(2));
        });
        assert_eq!(engine.record_activity(day(0)), StreakUpdate::ClockSkew);
        assert_eq!(engine.user().current_streak, 3);
        assert_eq!(engine.user().last_activity_date, Some(day(2)));
    }

    #[test]
    fn seventh_day_pays_milestone_once() {
        let mut engine = engine_with(|u| {
            u.current_streak = 6;
            u.longest_streak = 6;
            u.last_activity_date = Some(day(0));
        });

        let update = engine.record_activity(day(1));
        assert_eq!(
            update,
            StreakUpdate::Continued {
                streak: 7,
                milestone_bonus: Some(100),
            }
        );
        assert_eq!(engine.user().xp, 100);

        // Still day 1: streak stays at 7, no second bonus.
        engine.record_activity(day(1));
        engine.complete_writing(day(1));
        assert_eq!(engine.user().current_streak, 7);
        assert_eq!(engine.user().xp, 100 + WRITING_XP);

        let milestones: Vec<_> = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Event::StreakMilestone { .. }))
            .collect();
        assert_eq!(
            milestones,
            vec![Event::StreakMilestone {
                streak: 7,
                bonus_xp: 100,
            }]
        );
    }

    #[test]
    fn milestone_bonus_folds_into_award_level_up() {
        let mut engine = engine_with(|u| {
            u.xp = 50;
            u.current_streak = 6;
            u.longest_streak = 6;
            u.last_activity_date = Some(day(0));
        });
        let award = engine.complete_reading(day(1));
        // 50 + 15 + 100 milestone
        assert_eq!(award.total_xp, 165);
        assert!(award.level_up);
        assert_eq!(award.new_level, 2);
        assert_eq!(engine.user().current_streak, 7);
    }

    #[test]
    fn batch_reports_one_level_up_for_several_awards() {
        let mut engine = engine_with(|u| u.xp = 95);
        engine.begin_batch();
        let first = engine.complete_lesson(true, day(0));
        assert!(first.level_up);
        engine.complete_challenge("perfect_day@2026-10-12", day(0));
        engine.complete_challenge("xp_hunter@2026-10-11", day(0));
        engine.complete_challenge("weekly_warrior@2026-10-11", day(0));
        assert!(engine.leveled_up_in_batch());
        assert!(!engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::LevelUp { .. })));

        assert!(engine.end_batch());
        assert!(!engine.leveled_up_in_batch());
        let level_ups: Vec<_> = engine
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Event::LevelUp { .. }))
            .collect();
        assert_eq!(
            level_ups,
            vec![Event::LevelUp {
                previous_level: 1,
                new_level: 3,
                total_xp: 280,
            }]
        );
        assert!(!engine.end_batch());
    }

    #[test]
    fn complete_challenge_is_idempotent() {
        let mut engine = fresh();
        let first = engine.complete_challenge("speed_reader", day(0));
        let second = engine.complete_challenge("speed_reader", day(0));
        assert_eq!(first.map(|a| a.xp_awarded), Some(CHALLENGE_XP));
        assert!(second.is_none());
        assert_eq!(engine.user().xp, CHALLENGE_XP);
        assert_eq!(engine.user().challenges_completed.len(), 1);
    }

    #[test]
    fn weekly_xp_resets_only_on_new_week() {
        // day(0) is Monday; the Sunday-anchored week runs day(-1)..=day(5)
        let mut engine = fresh();
        engine.complete_lesson(false, day(0));
        engine.complete_lesson(false, day(5));
        assert_eq!(engine.user().weekly_xp, 50);

        engine.complete_lesson(false, day(6));
        assert_eq!(engine.user().weekly_xp, 25);
        assert_eq!(engine.user().week_start_date, day(6));
        assert_eq!(engine.user().xp, 75);
    }

    #[test]
    fn refresh_streak_breaks_stale_streak() {
        let mut engine = engine_with(|u| {
            u.current_streak = 5;
            u.longest_streak = 5;
            u.last_activity_date = Some(day(0));
        });
        assert!(!engine.refresh_streak(day(1)));
        assert!(engine.refresh_streak(day(2)));
        assert_eq!(engine.user().current_streak, 0);
        assert_eq!(engine.user().longest_streak, 5);
    }

    #[test]
    fn badge_award_is_recorded_once() {
        let mut engine = fresh();
        assert!(engine.award_badge("first_steps", "First Steps"));
        assert!(!engine.award_badge("first_steps", "First Steps"));
        let events = engine.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::BadgeAwarded { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn celebrations_follow_preferences() {
        let mut engine = engine_with(|u| {
            u.xp = 90;
            u.preferences.celebrate_achievements = false;
        });
        engine.complete_lesson(false, day(0));
        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(e, Event::LevelUp { .. })));
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::Notification { .. })));
    }

    #[test]
    fn next_level_queries() {
        let engine = engine_with(|u| u.xp = 175);
        assert_eq!(engine.xp_for_next_level(), Some(75));
        assert_eq!(engine.progress_to_next_level(), 50.0);

        let maxed = engine_with(|u| u.xp = 100_000);
        assert_eq!(maxed.xp_for_next_level(), None);
        assert_eq!(maxed.progress_to_next_level(), 100.0);
    }

    #[test]
    fn weekly_goal_must_be_positive() {
        let mut engine = fresh();
        assert!(engine.set_weekly_goal(0).is_err());
        engine.set_weekly_goal(500).unwrap();
        assert_eq!(engine.user().weekly_goal, 500);
    }
}

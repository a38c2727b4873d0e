//! Gamification facade.
//!
//! [`Gamification`] owns the store, the clock and the three engines, and is
//! the only place they meet: the badge evaluator and the challenge rotator
//! never call each other or the store, they hand results back here and the
//! facade pays out through the progress engine.
//!
//! ## Mutation pipeline
//!
//! ```text
//! validate -> roll periods -> mutate progress -> badges -> challenges
//!          -> save both documents -> publish queued events -> ProgressChanged
//! ```

use chrono::NaiveDate;

use crate::badges::{AchievementSummary, Badge, BadgeCategory, BadgeEvaluator};
use crate::challenges::{
    find_challenge, ActiveChallenge, ActivityKind, Challenge, ChallengeRotator, ChallengeState,
    ChallengeStats,
};
use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::events::{Event, EventBus, NotificationKind, SubscriptionId};
use crate::locale::Locale;
use crate::progress::{Preferences, ProgressEngine, StreakUpdate, UserProgress, XpAward};
use crate::storage::document::{
    challenges_blob, load_challenges, load_progress, progress_blob, ExportDocument,
};
use crate::storage::{Config, StateStore, CHALLENGES_KEY, PROGRESS_KEY};

pub struct Gamification<S: StateStore, C: Clock> {
    store: S,
    clock: C,
    config: Config,
    progress: ProgressEngine,
    badges: BadgeEvaluator,
    challenges: ChallengeRotator,
    bus: EventBus,
    /// Events of the call in progress, published on commit.
    pending: Vec<Event>,
}

impl<S: StateStore, C: Clock> Gamification<S, C> {
    /// Load both documents, roll periods, draw challenges, save and
    /// broadcast the initial snapshot.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn open(store: S, clock: C, config: Config) -> Result<Self> {
        let today = clock.today();
        let user = load_progress(
            store.load(PROGRESS_KEY)?.as_deref(),
            fresh_user(&config, today),
        );
        let state = load_challenges(
            store.load(CHALLENGES_KEY)?.as_deref(),
            fresh_challenges(&config, today),
        );

        let mut game = Self {
            progress: ProgressEngine::new(
                user,
                config.week_start(),
                config.locale(),
                config.goals.weekly_xp_goal,
            ),
            challenges: ChallengeRotator::new(state, config.week_start(), config.rotation()),
            badges: BadgeEvaluator::new(),
            bus: EventBus::new(),
            pending: Vec::new(),
            store,
            clock,
            config,
        };

        game.begin();
        game.check_badges();
        game.commit()?;
        Ok(game)
    }

    // ── Activity API ─────────────────────────────────────────────────

    pub fn complete_lesson(&mut self, perfect: bool) -> Result<XpAward> {
        let today = self.begin();
        let award = self.progress.complete_lesson(perfect, today);
        self.after_activity(today, &award);
        if self.auto_track() {
            self.track(ActivityKind::LessonComplete, 1, today);
            if perfect {
                self.track(ActivityKind::PerfectScore, 1, today);
            }
        }
        self.finish(today, award)
    }

    pub fn complete_reading(&mut self) -> Result<XpAward> {
        let today = self.begin();
        let award = self.progress.complete_reading(today);
        self.after_activity(today, &award);
        if self.auto_track() {
            self.track(ActivityKind::ReadingExercise, 1, today);
        }
        self.finish(today, award)
    }

    pub fn complete_writing(&mut self) -> Result<XpAward> {
        let today = self.begin();
        let award = self.progress.complete_writing(today);
        self.after_activity(today, &award);
        if self.auto_track() {
            self.track(ActivityKind::WritingExercise, 1, today);
        }
        self.finish(today, award)
    }

    /// Award arbitrary XP. Zero is rejected before anything changes.
    pub fn award_xp(&mut self, amount: u64, activity: &str) -> Result<XpAward> {
        if amount == 0 {
            return Err(ValidationError::InvalidAmount {
                field: "xp".into(),
                value: amount,
            }
            .into());
        }
        let today = self.begin();
        let award = self.progress.award_xp(amount, activity, today)?;
        self.after_activity(today, &award);
        self.finish(today, award)
    }

    /// Record today as active without awarding XP.
    pub fn record_activity(&mut self) -> Result<StreakUpdate> {
        let today = self.begin();
        let update = self.progress.record_activity(today);
        self.collect();
        self.check_badges();
        self.evaluate_challenges(today);
        self.commit()?;
        Ok(update)
    }

    /// Complete a challenge by id.
    ///
    /// Catalog challenges are recorded under their period key, so the call
    /// is a no-op (`Ok(None)`) when the challenge is already done for the
    /// current day or week. Ids outside the catalog are recorded as given.
    pub fn complete_challenge(&mut self, challenge_id: &str) -> Result<Option<XpAward>> {
        let today = self.begin();
        let award = match find_challenge(challenge_id) {
            Some(challenge) => {
                self.challenges.complete(challenge.id);
                self.reward_challenge(challenge, today)
            }
            None => self.progress.complete_challenge(challenge_id, today),
        };
        self.collect();
        self.check_badges();
        let award = award.map(|a| self.settle(a));
        self.commit()?;
        Ok(award)
    }

    /// Feed a challenge counter directly. Zero amounts are rejected.
    pub fn update_challenge_progress(
        &mut self,
        kind: ActivityKind,
        amount: u64,
    ) -> Result<Vec<&'static Challenge>> {
        if amount == 0 {
            return Err(ValidationError::InvalidAmount {
                field: kind.as_str().into(),
                value: amount,
            }
            .into());
        }
        let today = self.begin();
        let completed = self.track(kind, amount, today);
        self.check_badges();
        self.commit()?;
        Ok(completed)
    }

    // ── Settings and data ────────────────────────────────────────────

    pub fn set_weekly_goal(&mut self, goal: u64) -> Result<()> {
        self.progress.set_weekly_goal(goal)?;
        self.begin();
        self.check_badges();
        self.commit()
    }

    pub fn set_preferences(&mut self, preferences: Preferences) -> Result<()> {
        self.progress.set_preferences(preferences);
        self.commit()
    }

    /// Pretty-printed backup of progress and challenge state.
    pub fn export(&self) -> Result<String> {
        ExportDocument::new(
            self.progress.user().clone(),
            self.challenges.state().clone(),
        )
        .to_pretty_json()
    }

    /// Replace all state with a backup. On a parse failure nothing changes.
    pub fn import(&mut self, text: &str) -> Result<()> {
        let doc = ExportDocument::parse(text)?;
        let today = self.clock.today();
        tracing::info!(xp = doc.user.xp, "importing progress");

        self.pending.clear();
        self.progress.replace_user(doc.user);
        self.challenges.replace_state(
            doc.challenges
                .unwrap_or_else(|| fresh_challenges(&self.config, today)),
        );
        self.begin();
        self.check_badges();
        self.commit()
    }

    /// Delete persisted state and start over from configured defaults.
    pub fn reset_progress(&mut self) -> Result<()> {
        let today = self.clock.today();
        tracing::info!("resetting all progress");
        for key in [PROGRESS_KEY, CHALLENGES_KEY] {
            self.store.remove(key)?;
        }

        self.pending.clear();
        self.progress.replace_user(fresh_user(&self.config, today));
        self.challenges
            .replace_state(fresh_challenges(&self.config, today));
        self.begin();
        self.commit()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn user(&self) -> &UserProgress {
        self.progress.user()
    }

    pub fn progress_to_next_level(&self) -> f64 {
        self.progress.progress_to_next_level()
    }

    pub fn xp_for_next_level(&self) -> Option<u64> {
        self.progress.xp_for_next_level()
    }

    pub fn badge(&self, badge_id: &str) -> Option<&'static Badge> {
        self.badges.badge(badge_id)
    }

    pub fn all_badges(&self) -> &'static [Badge] {
        self.badges.all_badges()
    }

    pub fn user_badges(&self) -> Vec<&'static Badge> {
        self.badges.user_badges(self.progress.user())
    }

    pub fn available_badges(&self) -> Vec<&'static Badge> {
        self.badges.available_badges(self.progress.user())
    }

    pub fn nearby_badges(&self, limit: usize) -> Vec<&'static Badge> {
        self.badges.nearby_badges(self.progress.user(), limit)
    }

    pub fn badges_by_category(&self, category: BadgeCategory) -> Vec<&'static Badge> {
        self.badges.badges_by_category(category)
    }

    /// Percentage toward a badge; `None` if unknown or already earned.
    pub fn progress_to_badge(&self, badge_id: &str) -> Option<f64> {
        self.badges.progress_towards(badge_id, self.progress.user())
    }

    pub fn achievement_summary(&self) -> AchievementSummary {
        self.badges.summary(self.progress.user())
    }

    pub fn active_challenges(&self) -> Vec<ActiveChallenge> {
        self.challenges
            .active_challenges(self.progress.user().current_streak, self.clock.today())
    }

    pub fn challenge_progress(&self, challenge_id: &str) -> Option<f64> {
        self.challenges.challenge_progress(
            challenge_id,
            self.progress.user().current_streak,
            self.clock.today(),
        )
    }

    pub fn challenge_stats(&self) -> ChallengeStats {
        self.challenges.stats()
    }

    pub fn challenge_state(&self) -> &ChallengeState {
        self.challenges.state()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Events ───────────────────────────────────────────────────────

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Take buffered published events, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    // ── Pipeline ─────────────────────────────────────────────────────

    /// Roll weekly XP, streak and challenge periods to today, and open the
    /// level-up batch that `commit` closes.
    fn begin(&mut self) -> NaiveDate {
        let today = self.clock.today();
        self.progress.begin_batch();
        self.progress.roll_weekly_window(today);
        self.progress.refresh_streak(today);
        let rolled = self.challenges.check_resets(today);
        self.collect();
        if rolled.any() {
            self.pending.push(Event::ChallengesRotated {
                daily: rolled.daily,
                weekly: rolled.weekly,
                active: self
                    .challenges
                    .state()
                    .active_challenges
                    .iter()
                    .cloned()
                    .collect(),
            });
        }
        today
    }

    fn after_activity(&mut self, today: NaiveDate, award: &XpAward) {
        self.collect();
        self.check_badges();
        if self.auto_track() {
            self.track(ActivityKind::XpEarned, award.xp_awarded, today);
        }
    }

    fn finish(&mut self, today: NaiveDate, award: XpAward) -> Result<XpAward> {
        self.evaluate_challenges(today);
        self.check_badges();
        let award = self.settle(award);
        self.commit()?;
        Ok(award)
    }

    /// Report totals and level as of the end of the call, including any
    /// challenge payouts it triggered.
    fn settle(&self, award: XpAward) -> XpAward {
        let user = self.progress.user();
        XpAward {
            total_xp: user.xp,
            new_level: user.level,
            level_up: self.progress.leveled_up_in_batch(),
            ..award
        }
    }

    fn auto_track(&self) -> bool {
        self.config.challenges.auto_track_activities
    }

    fn check_badges(&mut self) {
        self.badges.check_all_against(&mut self.progress);
        self.collect();
    }

    /// Bump a challenge counter and pay out anything it completed.
    fn track(&mut self, kind: ActivityKind, amount: u64, today: NaiveDate) -> Vec<&'static Challenge> {
        let streak = self.progress.user().current_streak;
        match self.challenges.update_progress(kind, amount, streak, today) {
            Ok(completed) => {
                for &challenge in &completed {
                    self.reward_challenge(challenge, today);
                }
                completed
            }
            Err(e) => {
                tracing::debug!(activity = %kind, error = %e, "challenge counter not updated");
                Vec::new()
            }
        }
    }

    /// Catch challenges that complete without a counter change (streaks).
    fn evaluate_challenges(&mut self, today: NaiveDate) {
        let streak = self.progress.user().current_streak;
        for challenge in self.challenges.evaluate(streak, today) {
            self.reward_challenge(challenge, today);
        }
    }

    fn reward_challenge(&mut self, challenge: &'static Challenge, today: NaiveDate) -> Option<XpAward> {
        let key = self.challenges.completion_key(challenge, today);
        let award = self.progress.complete_challenge(&key, today);
        self.collect();
        let award = award?;

        tracing::debug!(challenge_id = challenge.id, "challenge completed");
        self.pending.push(Event::ChallengeCompleted {
            challenge_id: challenge.id.to_string(),
            kind: challenge.kind,
            xp_awarded: award.xp_awarded,
        });
        if self.progress.user().preferences.show_notifications {
            let locale = self.config.locale();
            let name = challenge.name.get(locale);
            let message = match locale {
                Locale::En => format!("🏆 Challenge Complete: {name}!"),
                Locale::Zh => format!("🏆 挑战完成：{name}！"),
            };
            self.pending.push(Event::Notification {
                kind: NotificationKind::Success,
                message,
            });
        }
        Some(award)
    }

    fn collect(&mut self) {
        self.pending.extend(self.progress.drain_events());
    }

    /// Save both documents, then publish everything queued by this call.
    fn commit(&mut self) -> Result<()> {
        self.progress.end_batch();
        self.collect();
        let saved = self.save();
        for event in std::mem::take(&mut self.pending) {
            self.bus.publish(event);
        }
        self.bus.publish(Event::ProgressChanged {
            user: self.progress.user().clone(),
        });
        saved
    }

    fn save(&self) -> Result<()> {
        let result = progress_blob(self.progress.user())
            .and_then(|blob| Ok(self.store.save(PROGRESS_KEY, &blob)?))
            .and_then(|()| challenges_blob(self.challenges.state()))
            .and_then(|blob| Ok(self.store.save(CHALLENGES_KEY, &blob)?));
        if let Err(e) = &result {
            tracing::warn!(error = %e, "failed to save gamification state");
        }
        result
    }
}

fn fresh_user(config: &Config, today: NaiveDate) -> UserProgress {
    UserProgress::new(
        config.week_start().anchor(today),
        config.goals.weekly_xp_goal,
        config.preferences(),
    )
}

fn fresh_challenges(config: &Config, today: NaiveDate) -> ChallengeState {
    ChallengeState::new(today, config.week_start().anchor(today))
}

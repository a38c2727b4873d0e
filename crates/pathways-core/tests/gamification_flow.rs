//! End-to-end scenarios through the `Gamification` facade.
//!
//! Every test drives a `FixedClock` and a `MemoryStore`, so days and weeks
//! are moved explicitly and persisted documents can be inspected.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use pathways_core::challenges::ChallengeKind;
use pathways_core::storage::{CHALLENGES_KEY, PROGRESS_KEY};
use pathways_core::{
    ActivityKind, Config, Event, FixedClock, Gamification, Locale, MemoryStore, StateStore,
    StreakUpdate,
};

// 2026-10-14 is a Wednesday; the Sunday-anchored week started 2026-10-11.
fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

fn config() -> Config {
    let mut config = Config::default();
    config.challenges.seed = Some(2026);
    config
}

struct Harness {
    game: Gamification<MemoryStore, FixedClock>,
    clock: FixedClock,
    store: MemoryStore,
}

fn harness_with(config: Config) -> Harness {
    let clock = FixedClock::new(wednesday());
    let store = MemoryStore::new();
    let mut game = Gamification::open(store.clone(), clock.clone(), config).unwrap();
    game.drain_events();
    Harness { game, clock, store }
}

fn harness() -> Harness {
    harness_with(config())
}

/// Seeded store with a preset progress document.
fn harness_from(user_json: serde_json::Value) -> Harness {
    let clock = FixedClock::new(wednesday());
    let store = MemoryStore::with_entry(
        PROGRESS_KEY,
        &serde_json::json!({ "version": 1, "user": user_json }).to_string(),
    );
    let mut game = Gamification::open(store.clone(), clock.clone(), config()).unwrap();
    game.drain_events();
    Harness { game, clock, store }
}

#[test]
fn fresh_user_perfect_lesson() {
    let mut h = harness();
    let award = h.game.complete_lesson(true).unwrap();

    let user = h.game.user();
    assert_eq!(award.xp_awarded, 35);
    assert!(!award.level_up);
    assert_eq!(user.level, 1);
    assert_eq!(user.perfect_scores, 1);
    assert_eq!(user.total_lessons_completed, 1);
    assert_eq!(user.current_streak, 1);
    assert!(user.badges.contains("first_steps"));
}

#[test]
fn lesson_crossing_level_two_fires_level_up() {
    let mut h = harness_from(serde_json::json!({ "xp": 90 }));
    let award = h.game.complete_lesson(false).unwrap();

    assert_eq!(award.total_xp, 115);
    assert!(award.level_up);
    assert_eq!(award.new_level, 2);
    let events = h.game.drain_events();
    assert!(events.contains(&Event::LevelUp {
        previous_level: 1,
        new_level: 2,
        total_xp: 115,
    }));
}

#[test]
fn challenge_payouts_fold_into_one_level_up() {
    let store = MemoryStore::with_entry(
        PROGRESS_KEY,
        &serde_json::json!({ "version": 1, "user": { "xp": 95 } }).to_string(),
    );
    store
        .save(
            CHALLENGES_KEY,
            &serde_json::json!({
                "activeChallenges": ["perfect_day", "weekly_warrior", "xp_hunter"],
                "weeklyProgress": {
                    "2026-10-11": { "lessonsThisWeek": 4, "xpThisWeek": 480 }
                },
                "lastResetDate": "2026-10-14",
                "lastWeekResetDate": "2026-10-11",
            })
            .to_string(),
        )
        .unwrap();
    let mut game = Gamification::open(store, FixedClock::new(wednesday()), config()).unwrap();
    game.drain_events();

    let award = game.complete_lesson(true).unwrap();

    let user = game.user();
    assert_eq!(user.xp, 280);
    assert_eq!(user.level, 3);
    assert_eq!(award.xp_awarded, 35);
    assert_eq!(award.total_xp, 280);
    assert_eq!(award.new_level, 3);
    assert!(award.level_up);

    let events = game.drain_events();
    let completed = events
        .iter()
        .filter(|e| matches!(e, Event::ChallengeCompleted { .. }))
        .count();
    assert_eq!(completed, 3);
    let level_ups: Vec<_> = events
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
}

#[test]
fn repeated_challenges_accumulate_toward_champion() {
    let mut h = harness();
    for _ in 0..5 {
        assert!(h.game.complete_challenge("speed_reader").unwrap().is_some());
        assert!(h.game.complete_challenge("speed_reader").unwrap().is_none());
        h.clock.advance_days(1);
    }

    let completed = &h.game.user().challenges_completed;
    assert_eq!(completed.len(), 5);
    assert!(completed.contains("speed_reader@2026-10-14"));
    assert!(completed.contains("speed_reader@2026-10-18"));
    assert!(h.game.user().badges.contains("challenge_champion"));
}

#[test]
fn streak_continues_breaks_and_pays_milestone_once() {
    let mut h = harness_from(serde_json::json!({
        "currentStreak": 6,
        "longestStreak": 6,
        "lastActivityDate": "2026-10-13",
    }));
    assert_eq!(h.game.user().current_streak, 6);

    let update = h.game.record_activity().unwrap();
    assert_eq!(
        update,
        StreakUpdate::Continued {
            streak: 7,
            milestone_bonus: Some(100),
        }
    );
    h.game.record_activity().unwrap();
    h.game.complete_reading().unwrap();
    assert_eq!(h.game.user().current_streak, 7);

    let milestones: Vec<_> = h
        .game
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
    assert!(h.game.user().badges.contains("streak_master"));

    // Three days later the streak restarts at 1.
    h.clock.advance_days(3);
    h.game.complete_writing().unwrap();
    assert_eq!(h.game.user().current_streak, 1);
    assert_eq!(h.game.user().longest_streak, 7);
}

#[test]
fn stale_streak_is_zeroed_on_open() {
    let h = harness_from(serde_json::json!({
        "currentStreak": 4,
        "longestStreak": 9,
        "lastActivityDate": "2026-10-10",
    }));
    assert_eq!(h.game.user().current_streak, 0);
    assert_eq!(h.game.user().longest_streak, 9);
}

#[test]
fn weekly_xp_resets_on_new_week_only() {
    let mut h = harness();
    h.game.complete_lesson(false).unwrap();
    h.clock.advance_days(3); // Saturday, same week
    h.game.complete_lesson(false).unwrap();
    assert_eq!(h.game.user().weekly_xp, 50);

    h.clock.advance_days(1); // Sunday opens a new week
    h.game.complete_lesson(false).unwrap();
    assert_eq!(h.game.user().weekly_xp, 25);
    assert_eq!(
        h.game.user().week_start_date,
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    );
    assert_eq!(h.game.user().xp, 75);
}

#[test]
fn monday_weeks_follow_config() {
    let mut config = config();
    config.calendar.week_starts_on = pathways_core::WeekStart::Monday;
    let mut h = harness_with(config);
    assert_eq!(
        h.game.user().week_start_date,
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
    );

    h.game.complete_reading().unwrap();
    h.clock.advance_days(4); // Sunday is still the same Monday week
    h.game.complete_reading().unwrap();
    assert_eq!(h.game.user().weekly_xp, 30);
}

#[test]
fn completing_a_challenge_twice_pays_once() {
    let mut h = harness();
    let first = h.game.complete_challenge("perfect_day").unwrap();
    let second = h.game.complete_challenge("perfect_day").unwrap();

    assert_eq!(first.map(|a| a.xp_awarded), Some(50));
    assert!(second.is_none());
    assert_eq!(h.game.user().xp, 50);

    let completions: Vec<_> = h
        .game
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, Event::ChallengeCompleted { .. }))
        .collect();
    assert_eq!(
        completions,
        vec![Event::ChallengeCompleted {
            challenge_id: "perfect_day".into(),
            kind: ChallengeKind::Daily,
            xp_awarded: 50,
        }]
    );
}

#[test]
fn daily_challenge_can_be_earned_again_tomorrow() {
    let mut h = harness();
    assert!(h.game.complete_challenge("speed_reader").unwrap().is_some());
    h.clock.advance_days(1);
    assert!(h.game.complete_challenge("speed_reader").unwrap().is_some());

    let completed = &h.game.user().challenges_completed;
    assert!(completed.contains("speed_reader@2026-10-14"));
    assert!(completed.contains("speed_reader@2026-10-15"));
}

#[test]
fn unknown_challenge_id_is_recorded_as_given() {
    let mut h = harness();
    assert!(h.game.complete_challenge("community_event").unwrap().is_some());
    assert!(h.game.complete_challenge("community_event").unwrap().is_none());
    assert!(h.game.user().challenges_completed.contains("community_event"));
    assert_eq!(h.game.challenge_progress("community_event"), None);
}

#[test]
fn tracked_activity_completes_active_challenge() {
    let mut h = harness();
    let active: Vec<_> = h
        .game
        .active_challenges()
        .iter()
        .map(|a| a.challenge.id)
        .collect();
    assert_eq!(active.len(), 5);

    // Study time satisfies consistency_king in one step if it is active.
    let completed = h
        .game
        .update_challenge_progress(ActivityKind::StudyTime, 25)
        .unwrap();
    let expected = active.contains(&"consistency_king");
    assert_eq!(
        completed.iter().any(|c| c.id == "consistency_king"),
        expected
    );
    assert_eq!(h.game.challenge_progress("consistency_king"), Some(100.0));
    if expected {
        assert_eq!(h.game.user().xp, 50);
        assert_eq!(h.game.challenge_stats().daily_completed, 1);
    }
}

#[test]
fn challenge_xp_is_not_fed_back_into_counters() {
    let mut h = harness();
    h.game.complete_challenge("character_master").unwrap();
    h.game.complete_writing().unwrap();

    let weekly = h.game.challenge_state().weekly_progress["2026-10-11"];
    assert_eq!(weekly.xp_this_week, 20);
    assert_eq!(weekly.writing_this_week, 1);
}

#[test]
fn auto_tracking_can_be_switched_off() {
    let mut config = config();
    config.challenges.auto_track_activities = false;
    let mut h = harness_with(config);
    h.game.complete_lesson(true).unwrap();
    assert!(h.game.challenge_state().daily_progress.is_empty());
    assert!(h.game.challenge_state().weekly_progress.is_empty());
}

#[test]
fn daily_rollover_keeps_weekly_challenges() {
    let mut h = harness();
    let weekly_before: Vec<String> = h
        .game
        .active_challenges()
        .iter()
        .filter(|a| a.challenge.kind == ChallengeKind::Weekly)
        .map(|a| a.challenge.id.to_string())
        .collect();

    h.clock.advance_days(1);
    h.game.record_activity().unwrap();

    let rotated = h
        .game
        .drain_events()
        .into_iter()
        .find(|e| matches!(e, Event::ChallengesRotated { .. }));
    assert!(matches!(
        rotated,
        Some(Event::ChallengesRotated {
            daily: true,
            weekly: false,
            ..
        })
    ));
    for id in &weekly_before {
        assert!(h.game.challenge_state().active_challenges.contains(id));
    }
}

#[test]
fn every_mutation_ends_with_progress_changed_and_saves() {
    let mut h = harness();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = h.game.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    h.game.complete_reading().unwrap();
    assert!(matches!(
        seen.borrow().last(),
        Some(Event::ProgressChanged { user }) if user.xp == 15
    ));

    let saved: serde_json::Value =
        serde_json::from_str(&h.store.get(PROGRESS_KEY).unwrap()).unwrap();
    assert_eq!(saved["version"], 1);
    assert_eq!(saved["user"]["xp"], 15);
    assert!(h.store.get(CHALLENGES_KEY).is_some());

    assert!(h.game.unsubscribe(id));
    let before = seen.borrow().len();
    h.game.complete_reading().unwrap();
    assert_eq!(seen.borrow().len(), before);
}

#[test]
fn celebrations_respect_preferences() {
    let mut config = config();
    config.notifications.celebrate_achievements = false;
    let mut h = harness_with(config);
    h.game.complete_lesson(false).unwrap();

    let events = h.game.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BadgeAwarded { .. })));
    assert!(!events.iter().any(|e| matches!(
        e,
        Event::Notification { message, .. } if message.contains("Badge")
    )));
}

#[test]
fn chinese_locale_notifications() {
    let mut config = config();
    config.notifications.locale = Locale::Zh;
    let mut h = harness_with(config);
    h.game.complete_challenge("perfect_day").unwrap();

    let messages: Vec<String> = h
        .game
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Notification { message, .. } => Some(message),
            _ => None,
        })
        .collect();
    assert!(messages.iter().any(|m| m.contains("挑战完成")));
}

#[test]
fn weekly_goal_badge_and_settings() {
    let mut h = harness();
    assert!(h.game.set_weekly_goal(0).is_err());
    h.game.set_weekly_goal(50).unwrap();
    h.game.complete_lesson(false).unwrap();
    assert!(!h.game.user().badges.contains("weekly_warrior"));
    h.game.complete_lesson(false).unwrap();
    assert!(h.game.user().badges.contains("weekly_warrior"));

    let mut prefs = h.game.user().preferences;
    prefs.streak_reminders = false;
    h.game.set_preferences(prefs).unwrap();
    assert!(!h.game.user().preferences.streak_reminders);
}

#[test]
fn badge_queries_through_facade() {
    let mut h = harness();
    for _ in 0..3 {
        h.game.complete_lesson(false).unwrap();
    }
    assert_eq!(h.game.user_badges().len(), 1);
    assert_eq!(h.game.available_badges().len(), 14);
    assert_eq!(h.game.progress_to_badge("first_steps"), None);
    assert_eq!(h.game.progress_to_badge("no_such_badge"), None);
    assert_eq!(
        h.game.progress_to_badge("week_warrior"),
        Some(3.0 / 7.0 * 100.0)
    );
    assert_eq!(h.game.nearby_badges(1)[0].id, "week_warrior");

    let summary = h.game.achievement_summary();
    assert_eq!(summary.earned_badges, 1);
    assert_eq!(summary.total_badges, 15);
    assert_eq!(summary.completion_rate, 7);
}

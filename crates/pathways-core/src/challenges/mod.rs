//! Daily and weekly challenge rotation.

pub mod catalog;
pub mod counters;
pub mod rotator;
pub mod state;

pub use catalog::{
    find_challenge, Challenge, ChallengeCategory, ChallengeKind, Difficulty, Goal, Metric,
    DAILY_CHALLENGES, WEEKLY_CHALLENGES,
};
pub use counters::{ActivityKind, DailyCounters, ProgressSnapshot, WeeklyCounters};
pub use rotator::{ActiveChallenge, ChallengeRotator, ChallengeStats, Rollover, RotationSettings};
pub use state::ChallengeState;

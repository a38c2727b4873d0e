//! # Pathways Core Library
//!
//! This library provides the rewards engine behind Pathways: XP and levels,
//! daily streaks, permanently unlockable badges and rotating daily/weekly
//! challenges. It follows a CLI-first philosophy where every operation is
//! available via the standalone `pathways` binary; presentation layers only
//! consume the data and events exposed here.
//!
//! ## Architecture
//!
//! - **Progress Engine**: sole writer of [`UserProgress`]; XP, level, streaks
//!   and the weekly XP window
//! - **Badge Evaluator**: static badge table with data-only requirements
//! - **Challenge Rotator**: daily/weekly draws, period counters and rollover
//! - **Storage**: versioned JSON documents in a SQLite key-value table and
//!   TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Gamification`]: facade wiring the engines, the store and the clock
//! - [`EventBus`]: in-process pub/sub for level-ups, badges and challenges
//! - [`Database`]: SQLite-backed [`StateStore`]
//! - [`Config`]: Application configuration management

pub mod badges;
pub mod challenges;
pub mod clock;
pub mod error;
pub mod events;
pub mod gamification;
pub mod locale;
pub mod progress;
pub mod storage;

pub use badges::{AchievementSummary, Badge, BadgeCategory, BadgeEvaluator, BadgeRequirement};
pub use challenges::{
    ActiveChallenge, ActivityKind, Challenge, ChallengeKind, ChallengeRotator, ChallengeState,
    ChallengeStats,
};
pub use clock::{Clock, FixedClock, SystemClock, WeekStart};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::{Event, EventBus, NotificationKind, SubscriptionId};
pub use gamification::Gamification;
pub use locale::Locale;
pub use progress::{Preferences, ProgressEngine, StreakUpdate, UserProgress, XpAward};
pub use storage::{Config, Database, MemoryStore, StateStore};

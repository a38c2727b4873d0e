//! XP, levels and streaks.

pub mod engine;
pub mod levels;
pub mod rewards;
pub mod user;

pub use engine::{ProgressEngine, StreakUpdate, XpAward};
pub use levels::{level_for_xp, LEVEL_THRESHOLDS, MAX_LEVEL};
pub use user::{BadgeId, ChallengeId, Preferences, UserProgress};

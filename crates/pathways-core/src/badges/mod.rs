//! Permanently unlockable badges.

pub mod catalog;
pub mod evaluator;

pub use catalog::{Badge, BadgeCategory, BadgeRequirement, BADGES};
pub use evaluator::{AchievementSummary, BadgeEvaluator, CategoryProgress};

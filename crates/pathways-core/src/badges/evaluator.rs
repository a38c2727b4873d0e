//! Badge evaluation and badge-related queries.

use serde::Serialize;

use super::catalog::{Badge, BadgeCategory, BADGES};
use crate::progress::{ProgressEngine, UserProgress};

/// Earned/total counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub category: BadgeCategory,
    pub total: usize,
    pub earned: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementSummary {
    pub total_badges: usize,
    pub earned_badges: usize,
    pub completion_rate: u32,
    pub category_progress: Vec<CategoryProgress>,
}

/// Evaluates badge requirements against progress.
///
/// Holds no state of its own: earned badges are read from and written to
/// [`UserProgress::badges`] through the progress engine.
#[derive(Debug, Clone, Copy)]
pub struct BadgeEvaluator {
    catalog: &'static [Badge],
}

impl BadgeEvaluator {
    pub fn new() -> Self {
        Self { catalog: &BADGES }
    }

    /// Badges not yet earned whose requirement now holds. Pure.
    pub fn newly_satisfied(&self, progress: &UserProgress) -> Vec<&'static Badge> {
        self.catalog
            .iter()
            .filter(|b| !progress.badges.contains(b.id) && b.requirement.is_met(progress))
            .collect()
    }

    /// Evaluate every badge and award the newly satisfied ones through the
    /// engine. Returns the badges that were awarded by this call.
    pub fn check_all_against(&self, engine: &mut ProgressEngine) -> Vec<&'static Badge> {
        let unlocked = self.newly_satisfied(engine.user());
        for badge in &unlocked {
            engine.award_badge(badge.id, badge.name.en);
        }
        unlocked
    }

    /// Percentage toward `badge_id`, `None` if unknown or already earned.
    pub fn progress_towards(&self, badge_id: &str, progress: &UserProgress) -> Option<f64> {
        if progress.badges.contains(badge_id) {
            return None;
        }
        self.badge(badge_id)
            .map(|b| b.percent(progress))
    }

    pub fn badge(&self, badge_id: &str) -> Option<&'static Badge> {
        self.catalog.iter().find(|b| b.id == badge_id)
    }

    pub fn all_badges(&self) -> &'static [Badge] {
        self.catalog
    }

    /// Definitions of earned badges; ids missing from the catalog are skipped.
    pub fn user_badges(&self, progress: &UserProgress) -> Vec<&'static Badge> {
        self.catalog
            .iter()
            .filter(|b| progress.badges.contains(b.id))
            .collect()
    }

    pub fn available_badges(&self, progress: &UserProgress) -> Vec<&'static Badge> {
        self.catalog
            .iter()
            .filter(|b| !progress.badges.contains(b.id))
            .collect()
    }

    /// Unearned badges closest to unlocking, catalog order on ties.
    pub fn nearby_badges(&self, progress: &UserProgress, limit: usize) -> Vec<&'static Badge> {
        let mut ranked: Vec<(f64, &'static Badge)> = self
            .available_badges(progress)
            .into_iter()
            .map(|b| (b.percent(progress), b))
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked.into_iter().take(limit).map(|(_, b)| b).collect()
    }

    pub fn badges_by_category(&self, category: BadgeCategory) -> Vec<&'static Badge> {
        self.catalog
            .iter()
            .filter(|b| b.category == category)
            .collect()
    }

    pub fn summary(&self, progress: &UserProgress) -> AchievementSummary {
        let total_badges = self.catalog.len();
        let earned_badges = self.user_badges(progress).len();

        let category_progress = BadgeCategory::ALL
            .iter()
            .map(|&category| {
                let in_category = self.badges_by_category(category);
                let earned = in_category
                    .iter()
                    .filter(|b| progress.badges.contains(b.id))
                    .count();
                CategoryProgress {
                    category,
                    total: in_category.len(),
                    earned,
                    percentage: rounded_percent(earned, in_category.len()),
                }
            })
            .collect();

        AchievementSummary {
            total_badges,
            earned_badges,
            completion_rate: rounded_percent(earned_badges, total_badges),
            category_progress,
        }
    }
}

impl Default for BadgeEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

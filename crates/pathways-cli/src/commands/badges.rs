use clap::Subcommand;
use pathways_core::BadgeCategory;
use serde_json::json;

use super::{open_game, print_json, CliResult};

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List every badge with its earned state
    List,
    /// Badges not yet earned
    Available,
    /// Unearned badges closest to unlocking
    Nearby {
        #[arg(long, default_value = "3")]
        limit: usize,
    },
    /// Badges in one category (e.g. "consistency", "milestones")
    Category { name: String },
    /// Earned count, completion rate and per-category progress
    Summary,
    /// Percentage toward one badge
    Progress { id: String },
}

pub fn run(action: BadgesAction) -> CliResult {
    let game = open_game()?;
    match action {
        BadgesAction::List => {
            let earned = &game.user().badges;
            let badges: Vec<_> = game
                .all_badges()
                .iter()
                .map(|b| json!({ "badge": b, "earned": earned.contains(b.id) }))
                .collect();
            print_json(&badges)
        }
        BadgesAction::Available => print_json(&game.available_badges()),
        BadgesAction::Nearby { limit } => {
            let nearby: Vec<_> = game
                .nearby_badges(limit)
                .into_iter()
                .map(|b| json!({ "badge": b, "progress": game.progress_to_badge(b.id) }))
                .collect();
            print_json(&nearby)
        }
        BadgesAction::Category { name } => {
            let category = BadgeCategory::ALL
                .into_iter()
                .find(|c| c.as_str() == name)
                .ok_or_else(|| format!("unknown badge category: {name}"))?;
            print_json(&json!({
                "category": category,
                "color": category.color(),
                "badges": game.badges_by_category(category),
            }))
        }
        BadgesAction::Summary => print_json(&game.achievement_summary()),
        BadgesAction::Progress { id } => {
            let badge = game
                .badge(&id)
                .ok_or_else(|| format!("unknown badge: {id}"))?;
            let earned = game.user().badges.contains(badge.id);
            let progress = if earned {
                100.0
            } else {
                game.progress_to_badge(badge.id).unwrap_or(0.0)
            };
            print_json(&json!({
                "badgeId": badge.id,
                "earned": earned,
                "progress": progress,
            }))
        }
    }
}

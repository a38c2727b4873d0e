//! Learner status and per-learner settings stored with the progress
//! document (as opposed to `config`, which only seeds fresh state).

use clap::Subcommand;
use pathways_core::Preferences;
use serde_json::json;

use super::{open_game, print_json, CliResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Set the weekly XP goal
    Goal {
        /// XP per week (must be positive)
        xp: u64,
    },
    /// Change notification preferences; omitted flags keep their value
    Preferences {
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        streak_reminders: Option<bool>,
        #[arg(long)]
        celebrate: Option<bool>,
    },
}

pub fn status() -> CliResult {
    let game = open_game()?;
    print_json(&json!({
        "user": game.user(),
        "progressToNextLevel": game.progress_to_next_level(),
        "xpForNextLevel": game.xp_for_next_level(),
    }))
}

pub fn run(action: SettingsAction) -> CliResult {
    let mut game = open_game()?;
    match action {
        SettingsAction::Goal { xp } => {
            game.set_weekly_goal(xp)?;
        }
        SettingsAction::Preferences {
            notifications,
            streak_reminders,
            celebrate,
        } => {
            let current = game.user().preferences;
            game.set_preferences(Preferences {
                show_notifications: notifications.unwrap_or(current.show_notifications),
                streak_reminders: streak_reminders.unwrap_or(current.streak_reminders),
                celebrate_achievements: celebrate.unwrap_or(current.celebrate_achievements),
            })?;
        }
    }
    let user = game.user();
    print_json(&json!({
        "weeklyGoal": user.weekly_goal,
        "preferences": user.preferences,
    }))
}

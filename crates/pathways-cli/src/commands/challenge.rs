use clap::Subcommand;
use pathways_core::challenges::find_challenge;
use pathways_core::{ActivityKind, ValidationError};
use serde_json::json;

use super::{open_game, print_json, take_events, CliResult};

#[derive(Subcommand)]
pub enum ChallengeAction {
    /// Active challenges with completion state and progress
    List,
    /// Completed and active challenge counts
    Stats,
    /// Progress percentage of one challenge
    Progress { id: String },
    /// Complete a challenge by id
    Complete { id: String },
    /// Feed an activity counter (e.g. "study_time", "audio_exercise")
    Track {
        kind: ActivityKind,
        /// Units to add; minutes for study_time
        #[arg(long, default_value = "1")]
        amount: u64,
    },
}

pub fn run(action: ChallengeAction) -> CliResult {
    let mut game = open_game()?;
    match action {
        ChallengeAction::List => {
            let active: Vec<_> = game
                .active_challenges()
                .into_iter()
                .map(|c| {
                    let color = c.challenge.difficulty.color();
                    json!({ "challenge": c, "difficultyColor": color })
                })
                .collect();
            print_json(&active)
        }
        ChallengeAction::Stats => print_json(&game.challenge_stats()),
        ChallengeAction::Progress { id } => {
            let challenge =
                find_challenge(&id).ok_or_else(|| ValidationError::UnknownChallenge(id.clone()))?;
            print_json(&json!({
                "challengeId": challenge.id,
                "progress": game.challenge_progress(challenge.id),
            }))
        }
        ChallengeAction::Complete { id } => {
            let award = game.complete_challenge(&id)?;
            let events = take_events(&mut game);
            print_json(&json!({
                "challengeId": id,
                "award": award,
                "events": events,
            }))
        }
        ChallengeAction::Track { kind, amount } => {
            let completed: Vec<_> = game
                .update_challenge_progress(kind, amount)?
                .into_iter()
                .map(|c| c.id)
                .collect();
            let events = take_events(&mut game);
            print_json(&json!({
                "activity": kind,
                "amount": amount,
                "completed": completed,
                "events": events,
            }))
        }
    }
}

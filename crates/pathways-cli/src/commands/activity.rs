use pathways_core::XpAward;
use serde_json::json;

use super::{open_game, print_json, take_events, CliResult, Game};

fn report(game: &mut Game, award: &XpAward) -> CliResult {
    let events = take_events(game);
    print_json(&json!({
        "award": award,
        "user": game.user(),
        "events": events,
    }))
}

pub fn lesson(perfect: bool) -> CliResult {
    let mut game = open_game()?;
    let award = game.complete_lesson(perfect)?;
    report(&mut game, &award)
}

pub fn reading() -> CliResult {
    let mut game = open_game()?;
    let award = game.complete_reading()?;
    report(&mut game, &award)
}

pub fn writing() -> CliResult {
    let mut game = open_game()?;
    let award = game.complete_writing()?;
    report(&mut game, &award)
}

pub fn xp(amount: u64, activity: &str) -> CliResult {
    let mut game = open_game()?;
    let award = game.award_xp(amount, activity)?;
    report(&mut game, &award)
}

pub fn checkin() -> CliResult {
    let mut game = open_game()?;
    game.record_activity()?;
    let events = take_events(&mut game);
    let user = game.user();
    print_json(&json!({
        "currentStreak": user.current_streak,
        "longestStreak": user.longest_streak,
        "lastActivityDate": user.last_activity_date,
        "events": events,
    }))
}

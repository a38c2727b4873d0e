//! Subcommand handlers. Every command prints JSON on stdout.

pub mod activity;
pub mod badges;
pub mod challenge;
pub mod config;
pub mod data;
pub mod settings;

use pathways_core::{Config, Database, Event, Gamification, SystemClock};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Game = Gamification<Database, SystemClock>;

/// Open the engine over the on-disk store and config.
pub fn open_game() -> Result<Game, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    tracing::debug!(
        week_start = ?config.week_start(),
        locale = ?config.locale(),
        "opened store"
    );
    Ok(Gamification::open(db, SystemClock, config)?)
}

/// Events published since the last drain, minus the trailing snapshots.
pub fn take_events(game: &mut Game) -> Vec<Event> {
    game.drain_events()
        .into_iter()
        .filter(|e| !matches!(e, Event::ProgressChanged { .. }))
        .collect()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use super::{open_game, print_json, CliResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Print a JSON backup, or write it to a file
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace all progress with a backup file
    Import { file: PathBuf },
    /// Delete all progress and start over
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CliResult {
    match action {
        DataAction::Export { output } => {
            let game = open_game()?;
            let backup = game.export()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, backup)?;
                    print_json(&json!({ "exported": path }))
                }
                None => {
                    println!("{backup}");
                    Ok(())
                }
            }
        }
        DataAction::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let mut game = open_game()?;
            game.import(&text)?;
            print_json(&json!({ "imported": file, "user": game.user() }))
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err("refusing to reset progress without --yes".into());
            }
            let mut game = open_game()?;
            game.reset_progress()?;
            print_json(&json!({ "reset": true, "user": game.user() }))
        }
    }
}

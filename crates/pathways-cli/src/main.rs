use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pathways", version, about = "Pathways rewards engine CLI")]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Complete a lesson
    Lesson {
        /// The lesson was finished with a perfect score
        #[arg(long)]
        perfect: bool,
    },
    /// Complete a reading exercise
    Reading,
    /// Complete a writing exercise
    Writing,
    /// Award arbitrary XP
    Xp {
        /// Amount of XP (must be positive)
        amount: u64,
        /// Label recorded with the award
        #[arg(long, default_value = "manual")]
        activity: String,
    },
    /// Mark today as active without earning XP
    Checkin,
    /// Show level, streak and weekly progress
    Status,
    /// Learner settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Badge queries
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Daily and weekly challenges
    Challenge {
        #[command(subcommand)]
        action: commands::challenge::ChallengeAction,
    },
    /// Export, import or reset stored progress
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Lesson { perfect } => commands::activity::lesson(perfect),
        Commands::Reading => commands::activity::reading(),
        Commands::Writing => commands::activity::writing(),
        Commands::Xp { amount, activity } => commands::activity::xp(amount, &activity),
        Commands::Checkin => commands::activity::checkin(),
        Commands::Status => commands::settings::status(),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::Challenge { action } => commands::challenge::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pathways", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

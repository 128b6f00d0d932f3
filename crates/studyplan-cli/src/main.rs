use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "studyplan", version, about = "StudyPlan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calendar events
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Week view
    Week(commands::week::WeekArgs),
    /// Month view
    Month(commands::month::MonthArgs),
    /// Week grid gestures
    Grid {
        #[command(subcommand)]
        action: commands::grid::GridAction,
    },
    /// University career plan
    Career {
        #[command(subcommand)]
        action: commands::career::CareerAction,
    },
    /// Exams of the career plan
    Exam {
        #[command(subcommand)]
        action: commands::exam::ExamAction,
    },
    /// Study files attached to an exam
    File {
        #[command(subcommand)]
        action: commands::file::FileAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Notification settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Statistics and widget data
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("STUDYPLAN_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Event { action } => commands::event::run(action),
        Commands::Week(args) => commands::week::run(args),
        Commands::Month(args) => commands::month::run(args),
        Commands::Grid { action } => commands::grid::run(action),
        Commands::Career { action } => commands::career::run(action),
        Commands::Exam { action } => commands::exam::run(action),
        Commands::File { action } => commands::file::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Stats { action } => commands::stats::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

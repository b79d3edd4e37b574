pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "leadflow",
    about = "Leadflow operator CLI",
    long_about = "Operate leadflow migrations, readiness checks, and offline lead scoring.",
    after_help = "Examples:\n  leadflow migrate\n  leadflow doctor --json\n  leadflow score lead.json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Validate config, integration readiness, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Score a lead JSON file with the deterministic rule-based scorer")]
    Score {
        #[arg(help = "Path to a lead JSON file (webhook `data` shape)")]
        path: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Score { path, json } => commands::score::run(&path, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

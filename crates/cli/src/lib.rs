pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bidpilot",
    about = "Bidpilot operator CLI",
    long_about = "Turn a procurement document into a priced, review-gated bid package.",
    after_help = "Examples:\n  bidpilot run tender.pdf\n  bidpilot config\n  bidpilot doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Process a procurement document end to end and write the priced bid")]
    Run {
        #[arg(help = "Path to the RFP document (PDF)")]
        rfp: PathBuf,
        #[arg(long, help = "Material catalog CSV path override")]
        material_catalog: Option<PathBuf>,
        #[arg(long, help = "Service pricing CSV path override")]
        service_catalog: Option<PathBuf>,
        #[arg(long, help = "Directory for run artifacts override")]
        runs_dir: Option<PathBuf>,
        #[arg(long, help = "Config file path (defaults to bidpilot.toml when present)")]
        config: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, credential readiness, and catalog availability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { rfp, material_catalog, service_catalog, runs_dir, config } => {
            commands::run::run(commands::run::RunArgs {
                rfp,
                material_catalog,
                service_catalog,
                runs_dir,
                config,
            })
            .await
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

//! apitestgen CLI
//!
//! Command-line front end: keeps pytest files in sync with an OpenAPI
//! contract.
//!
//! Exit codes: `0` success, `1` fatal error, `2` partial success.

use apitestgen_core::logging_facility::{init, Profile};
use clap::{Parser, Subcommand, ValueEnum};

mod commands;

use commands::Outcome;

#[derive(Debug, Parser)]
#[command(name = "apitestgen")]
#[command(about = "apitestgen - OpenAPI contract to pytest synchronisation", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create, update and delete test files to match the contract
    Generate(commands::generate::GenerateArgs),
    /// Show what generate would change
    Diff(commands::diff::DiffArgs),
    /// Remove every generated test file
    Clean(commands::clean::CleanArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
    };

    match result {
        Ok(Outcome::Success) => {}
        Ok(Outcome::Partial) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

//! Generate command
//!
//! Usage: apitestgen generate --spec <FILE> --repo <DIR> [--dry-run] [--json]

use super::{print_summary, Outcome, OverrideArgs};
use apitestgen_engine::commands::{generate, GenerateOptions};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// OpenAPI 3.x contract (JSON or YAML)
    #[arg(long)]
    pub spec: PathBuf,

    /// Repository holding the generated tests
    #[arg(long)]
    pub repo: PathBuf,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Execute generate command
pub fn execute(args: GenerateArgs) -> Result<Outcome, Box<dyn std::error::Error>> {
    let options = GenerateOptions {
        overrides: args.overrides.into_overrides(),
        dry_run: args.dry_run,
        generated_at: None,
    };

    let summary = generate(&args.spec, &args.repo, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary("Generation summary", &summary);
    }

    Ok(Outcome::of(&summary))
}

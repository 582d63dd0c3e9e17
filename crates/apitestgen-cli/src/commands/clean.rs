//! Clean command
//!
//! Usage: apitestgen clean --repo <DIR> [--dry-run] [--json]

use super::{print_summary, Outcome};
use apitestgen_engine::commands::{clean, CleanOptions, ConfigOverrides};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Repository holding the generated tests
    #[arg(long)]
    pub repo: PathBuf,

    /// Test directory, relative to the repository root
    #[arg(long)]
    pub test_dir: Option<PathBuf>,

    /// List the files that would be removed
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute clean command
pub fn execute(args: CleanArgs) -> Result<Outcome, Box<dyn std::error::Error>> {
    let options = CleanOptions {
        overrides: ConfigOverrides {
            test_dir: args.test_dir,
            ..ConfigOverrides::default()
        },
        dry_run: args.dry_run,
    };

    let summary = clean(&args.repo, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary("Clean summary", &summary);
    }

    Ok(Outcome::of(&summary))
}

//! Diff command
//!
//! Usage: apitestgen diff --spec <FILE> --repo <DIR> [--json]

use super::{Outcome, OverrideArgs};
use apitestgen_engine::commands::{diff_only, DiffOptions};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// OpenAPI 3.x contract (JSON or YAML)
    #[arg(long)]
    pub spec: PathBuf,

    /// Repository holding the generated tests
    #[arg(long)]
    pub repo: PathBuf,

    /// Print the classification as JSON instead of Markdown
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<Outcome, Box<dyn std::error::Error>> {
    let options = DiffOptions {
        overrides: args.overrides.into_overrides(),
    };

    let report = diff_only(&args.spec, &args.repo, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.human_summary());
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
    }

    Ok(Outcome::Success)
}

pub mod clean;
pub mod diff;
pub mod generate;

use apitestgen_core::DuplicatePolicy;
use apitestgen_engine::commands::{ConfigOverrides, RunSummary};
use clap::Args;
use std::path::PathBuf;

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Some files failed; the others were processed
    Partial,
}

impl Outcome {
    pub fn of(summary: &RunSummary) -> Self {
        if summary.is_partial() {
            Outcome::Partial
        } else {
            Outcome::Success
        }
    }
}

/// Flags that override `apitestgen.toml`.
#[derive(Debug, Args, Default)]
pub struct OverrideArgs {
    /// Test directory, relative to the repository root
    #[arg(long)]
    pub test_dir: Option<PathBuf>,

    /// Do not generate invalid-payload cases
    #[arg(long)]
    pub no_negative: bool,

    /// Do not generate credential cases
    #[arg(long)]
    pub no_security: bool,

    /// What to do when two files claim the same endpoint
    /// (last-wins, first-wins, reject)
    #[arg(long)]
    pub duplicate_policy: Option<DuplicatePolicy>,

    /// Do not write the coverage report
    #[arg(long)]
    pub no_report: bool,
}

impl OverrideArgs {
    /// Unset flags leave the config file in charge.
    pub fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            test_dir: self.test_dir,
            negative_tests: self.no_negative.then_some(false),
            security_tests: self.no_security.then_some(false),
            duplicate_policy: self.duplicate_policy,
            write_report: self.no_report.then_some(false),
        }
    }
}

/// Human-readable run summary on stdout, problems on stderr.
pub fn print_summary(title: &str, summary: &RunSummary) {
    let dry = if summary.dry_run { " (dry run)" } else { "" };
    println!("{title}{dry}:");
    for path in &summary.created {
        println!("  + {}", path.display());
    }
    for path in &summary.updated {
        println!("  ~ {}", path.display());
    }
    for path in &summary.deleted {
        println!("  - {}", path.display());
    }
    println!(
        "  Created: {}  Updated: {}  Deleted: {}  Skipped: {}",
        summary.created.len(),
        summary.updated.len(),
        summary.deleted.len(),
        summary.skipped.len()
    );
    if let Some(report) = &summary.report_path {
        println!("  Report: {}", report.display());
    }

    for warning in &summary.warnings {
        eprintln!("warning: {warning}");
    }
    for failure in &summary.failures {
        eprintln!(
            "failed: {} {}: {}",
            failure.action,
            failure.path.display(),
            failure.error
        );
    }
}

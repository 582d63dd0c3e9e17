//! Command-line overrides layered on top of `apitestgen.toml`.

#![allow(clippy::result_large_err)]

use apitestgen_core::DuplicatePolicy;
use apitestgen_store::errors::{repository_not_found, Result};
use apitestgen_store::{load_config, GeneratorConfig, CONFIG_FILE_NAME};
use std::path::{Path, PathBuf};

/// Values that win over the config file when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub test_dir: Option<PathBuf>,
    pub negative_tests: Option<bool>,
    pub security_tests: Option<bool>,
    pub duplicate_policy: Option<DuplicatePolicy>,
    pub write_report: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply_to(&self, config: &mut GeneratorConfig) {
        if let Some(test_dir) = &self.test_dir {
            config.test_dir = test_dir.clone();
        }
        if let Some(negative) = self.negative_tests {
            config.negative_tests = negative;
        }
        if let Some(security) = self.security_tests {
            config.security_tests = security;
        }
        if let Some(policy) = self.duplicate_policy {
            config.duplicate_policy = policy;
        }
        if let Some(write_report) = self.write_report {
            config.write_report = write_report;
        }
    }
}

/// Check the repository root, load its config and apply the overrides.
///
/// # Errors
///
/// `RepositoryNotFound` for a missing root, `Config` for an invalid result.
pub(crate) fn resolve_config(repo_path: &Path, overrides: &ConfigOverrides) -> Result<GeneratorConfig> {
    if !repo_path.is_dir() {
        return Err(repository_not_found(repo_path));
    }
    let mut config = load_config(repo_path)?;
    overrides.apply_to(&mut config);
    config.validate(&repo_path.join(CONFIG_FILE_NAME))?;
    Ok(config)
}

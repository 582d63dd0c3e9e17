//! Generator configuration
//!
//! Read from an optional `apitestgen.toml` at the repository root. Every
//! field has a default, so a missing file is the default configuration.
//! Unknown keys are rejected so a typo never silently falls back.

#![allow(clippy::result_large_err)]

use crate::errors::{config_error, io_error_at, Result};
use apitestgen_core::DuplicatePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "apitestgen.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Sub-path of the repository holding generated tests
    pub test_dir: PathBuf,
    /// Extension of generated files, without the dot
    pub file_extension: String,
    pub base_url_env: String,
    /// Falls back to the contract's first server, then localhost
    pub default_base_url: Option<String>,
    pub negative_tests: bool,
    pub security_tests: bool,
    pub duplicate_policy: DuplicatePolicy,
    pub write_report: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            test_dir: PathBuf::from("tests/api"),
            file_extension: "py".to_string(),
            base_url_env: "API_BASE_URL".to_string(),
            default_base_url: None,
            negative_tests: true,
            security_tests: true,
            duplicate_policy: DuplicatePolicy::LastWins,
            write_report: true,
        }
    }
}

impl GeneratorConfig {
    /// Parse configuration text; `origin` only labels errors.
    ///
    /// # Errors
    ///
    /// Returns `Config` for invalid TOML, unknown keys or invalid values.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let mut config: GeneratorConfig =
            toml::from_str(content).map_err(|e| config_error(origin, &e.to_string()))?;
        config.normalize();
        config.validate(origin)?;
        Ok(config)
    }

    fn normalize(&mut self) {
        self.file_extension = self.file_extension.trim_start_matches('.').to_string();
    }

    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `Config` when the test dir escapes the repository or the
    /// extension is empty.
    pub fn validate(&self, origin: &Path) -> Result<()> {
        let escapes = self.test_dir.is_absolute()
            || self
                .test_dir
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes || self.test_dir.as_os_str().is_empty() {
            return Err(config_error(
                origin,
                &format!(
                    "test_dir must be a relative path inside the repository, got '{}'",
                    self.test_dir.display()
                ),
            ));
        }
        if self.file_extension.is_empty()
            || !self
                .file_extension
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(config_error(
                origin,
                &format!("invalid file_extension '{}'", self.file_extension),
            ));
        }
        if self.base_url_env.trim().is_empty() {
            return Err(config_error(origin, "base_url_env must not be empty"));
        }
        Ok(())
    }
}

/// Load `apitestgen.toml` from `repo_root`, or defaults when absent.
///
/// # Errors
///
/// Returns `Config` for a malformed file and `Io` when it cannot be read.
pub fn load_config(repo_root: &Path) -> Result<GeneratorConfig> {
    let path = repo_root.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(GeneratorConfig::default());
    }
    let content = fs::read_to_string(&path).map_err(|e| io_error_at("load_config", &path, e))?;
    GeneratorConfig::from_toml_str(&content, &path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apitestgen_core::errors::ExErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(temp_dir.path()).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.test_dir, PathBuf::from("tests/api"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "test_dir = \"qa/contract\"\nfile_extension = \".py\"\nduplicate_policy = \"reject\"\n",
        )
        .unwrap();

        let config = load_config(temp_dir.path()).unwrap();
        assert_eq!(config.test_dir, PathBuf::from("qa/contract"));
        assert_eq!(config.file_extension, "py");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
        assert!(config.negative_tests);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = GeneratorConfig::from_toml_str("tset_dir = \"x\"\n", Path::new("a.toml"))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_escaping_test_dir_is_rejected() {
        for bad in ["test_dir = \"../elsewhere\"", "test_dir = \"/abs\"", "test_dir = \"\""] {
            let err = GeneratorConfig::from_toml_str(bad, Path::new("a.toml")).unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::Config, "{bad}");
        }
    }

    #[test]
    fn test_bad_policy_is_rejected() {
        let err = GeneratorConfig::from_toml_str(
            "duplicate_policy = \"newest\"",
            Path::new("a.toml"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }
}

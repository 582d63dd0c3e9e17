//! Atomic write primitives
//!
//! Uses temp→rename pattern so a reader sees the old file or the new one,
//! never a half-written header.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error_at, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file
///
/// Uses temp file + rename to ensure atomic write
///
/// # Errors
///
/// Returns `Io` if the parent cannot be created or the write/rename fails.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error_at("create_test_dir", parent, e))?;
    }

    // Temp file in the same directory, keeping the full name so
    // `test_a.py` and `test_a.json` never share one
    let temp_path = temp_path_for(target_path);

    fs::write(&temp_path, content).map_err(|e| io_error_at("write_temp", &temp_path, e))?;

    if let Err(e) = fs::rename(&temp_path, target_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error_at("rename_temp", target_path, e));
    }

    Ok(())
}

fn temp_path_for(target_path: &Path) -> PathBuf {
    let mut name: OsString = target_path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    target_path.with_file_name(name)
}

//! Deterministic test-file names.

use crate::ir::{hash_string, EndpointId};

/// `test_<method>_<path slug>.<ext>`.
///
/// The slug lowercases the path and turns separators, braces and every
/// other non-alphanumeric character into single underscores.
pub fn file_name_for(id: &EndpointId, extension: &str) -> String {
    format!("{}.{extension}", test_stem(id))
}

/// Name used when [`file_name_for`] is already taken: the stem plus the
/// first 8 hex characters of the endpoint id's digest.
pub fn suffixed_file_name_for(id: &EndpointId, extension: &str) -> String {
    format!("{}_{}.{extension}", test_stem(id), collision_suffix(id))
}

/// Prefix shared by the file name and the test functions inside it.
pub fn test_stem(id: &EndpointId) -> String {
    let slug = path_slug(id.path());
    let method = id.method().to_ascii_lowercase();
    if slug.is_empty() {
        format!("test_{method}_root")
    } else {
        format!("test_{method}_{slug}")
    }
}

pub fn collision_suffix(id: &EndpointId) -> String {
    hash_string(&id.to_string())[..8].to_string()
}

fn path_slug(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

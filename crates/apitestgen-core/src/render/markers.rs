//! Machine-owned region delimited by marker lines.

use std::fmt;
use std::ops::Range;

pub const NEGATIVE_START: &str = "# >>> apitestgen:negative-cases (machine-owned, regenerated) >>>";
pub const NEGATIVE_END: &str = "# <<< apitestgen:negative-cases <<<";

/// Why a file's marker region cannot be patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerError {
    Missing,
    Duplicated,
    OutOfOrder,
}

impl fmt::Display for MarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarkerError::Missing => "negative-case markers are missing",
            MarkerError::Duplicated => "negative-case markers appear more than once",
            MarkerError::OutOfOrder => "negative-case end marker precedes the start marker",
        })
    }
}

/// Byte range between the start marker line and the end marker line.
pub fn find_region(content: &str) -> Result<Range<usize>, MarkerError> {
    let mut start: Option<usize> = None;
    let mut end: Option<usize> = None;
    let mut duplicated = false;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let text = line.trim_end_matches(['\n', '\r']);
        if text == NEGATIVE_START {
            duplicated |= start.replace(offset + line.len()).is_some();
        } else if text == NEGATIVE_END {
            duplicated |= end.replace(offset).is_some();
        }
        offset += line.len();
    }

    match (start, end) {
        _ if duplicated => Err(MarkerError::Duplicated),
        (Some(start), Some(end)) if end >= start => Ok(start..end),
        (Some(_), Some(_)) => Err(MarkerError::OutOfOrder),
        _ => Err(MarkerError::Missing),
    }
}

/// Replace the inside of the marker region, keeping every other byte.
pub fn replace_region(content: &str, inner: &str) -> Result<String, MarkerError> {
    let range = find_region(content)?;
    let mut out = String::with_capacity(content.len() + inner.len());
    out.push_str(&content[..range.start]);
    out.push_str(inner);
    out.push_str(&content[range.end..]);
    Ok(out)
}

/// Wrap `inner` in marker lines.
pub fn wrap_region(inner: &str) -> String {
    format!("{NEGATIVE_START}\n{inner}{NEGATIVE_END}\n")
}

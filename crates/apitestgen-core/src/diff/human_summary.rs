//! Human-readable summary renderer for contract diffs.

use crate::diff::model::{DiffEntry, DiffResult};

/// Render a Markdown summary of a [`DiffResult`].
///
/// Informational only; the structured result is what drives generation.
pub fn render_human_summary(diff: &DiffResult) -> String {
    let mut out = String::new();

    out.push_str("## Contract Diff\n\n");
    out.push_str(&format!(
        "**Create**: {}  **Update**: {}  **Skip**: {}  **Delete**: {}\n\n",
        diff.to_create.len(),
        diff.to_update.len(),
        diff.to_skip.len(),
        diff.to_delete.len()
    ));

    if diff.is_noop() {
        out.push_str("_Tests are in sync with the contract._\n");
        return out;
    }

    if !diff.to_create.is_empty() {
        out.push_str("### Create\n\n");
        for entry in &diff.to_create {
            out.push_str(&format!("+ `{}`\n", entry.endpoint_id));
        }
        out.push('\n');
    }

    if !diff.to_update.is_empty() {
        out.push_str("### Update\n\n");
        for entry in &diff.to_update {
            let reasons: Vec<String> = entry.changes.iter().map(ToString::to_string).collect();
            out.push_str(&format!(
                "~ `{}`{}: {}\n",
                entry.endpoint_id,
                file_suffix(entry),
                reasons.join("; ")
            ));
        }
        out.push('\n');
    }

    if !diff.to_delete.is_empty() {
        out.push_str("### Delete\n\n");
        for entry in &diff.to_delete {
            out.push_str(&format!("- `{}`{}\n", entry.endpoint_id, file_suffix(entry)));
        }
        out.push('\n');
    }

    out
}

fn file_suffix(entry: &DiffEntry) -> String {
    entry
        .metadata
        .as_ref()
        .map(|m| format!(" ({})", m.file_path.display()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::model::ChangeReason;
    use crate::ir::EndpointId;

    fn entry(method: &str, path: &str) -> DiffEntry {
        DiffEntry {
            endpoint_id: EndpointId::new(method, path),
            endpoint: None,
            metadata: None,
            changes: Vec::new(),
        }
    }

    #[test]
    fn test_noop_summary() {
        let diff = DiffResult {
            to_skip: vec![entry("GET", "/users")],
            ..DiffResult::default()
        };
        let summary = render_human_summary(&diff);
        assert!(summary.contains("**Skip**: 1"));
        assert!(summary.contains("in sync"));
    }

    #[test]
    fn test_summary_lists_each_category() {
        let mut update = entry("POST", "/users");
        update.changes.push(ChangeReason::RequestSchemaChanged);
        let diff = DiffResult {
            to_create: vec![entry("GET", "/users")],
            to_update: vec![update],
            to_skip: vec![],
            to_delete: vec![entry("DELETE", "/legacy")],
        };
        let summary = render_human_summary(&diff);
        assert!(summary.contains("+ `GET /users`"));
        assert!(summary.contains("~ `POST /users`: request schema changed"));
        assert!(summary.contains("- `DELETE /legacy`"));
    }
}

//! Classifies every contract endpoint against recovered generation state.

use crate::diff::model::{ChangeReason, DiffEntry, DiffOutcome, DiffResult, DuplicatePolicy};
use crate::errors::{ExError, ExErrorKind, Result};
use crate::ir::{ApiSpec, Endpoint, EndpointId};
use crate::metadata::TestFileMetadata;
use crate::warnings::{RunWarning, WarningKind};
use std::collections::BTreeMap;

/// Compare a contract against the metadata of previously generated files.
///
/// - no metadata for an endpoint: Create
/// - all hashes equal and the same set of statuses: Skip
/// - anything else: Update
/// - metadata for an endpoint the contract no longer has: Delete
///
/// Pure: identical inputs produce identical output.
///
/// # Errors
///
/// Returns `DuplicateMetadata` only under [`DuplicatePolicy::Reject`].
pub fn diff(
    spec: &ApiSpec,
    metadata: &[TestFileMetadata],
    policy: DuplicatePolicy,
) -> Result<DiffOutcome> {
    let mut warnings = Vec::new();
    let mut index = index_metadata(metadata, policy, &mut warnings)?;
    let mut result = DiffResult::default();

    for endpoint in spec.endpoints() {
        match index.remove(&endpoint.id) {
            None => result.to_create.push(DiffEntry {
                endpoint_id: endpoint.id.clone(),
                endpoint: Some(endpoint.clone()),
                metadata: None,
                changes: Vec::new(),
            }),
            Some(meta) => {
                let changes = compare(endpoint, meta);
                let entry = DiffEntry {
                    endpoint_id: endpoint.id.clone(),
                    endpoint: Some(endpoint.clone()),
                    metadata: Some(meta.clone()),
                    changes,
                };
                if entry.changes.is_empty() {
                    result.to_skip.push(entry);
                } else {
                    result.to_update.push(entry);
                }
            }
        }
    }

    // Whatever was never visited is gone from the contract.
    for (endpoint_id, meta) in index {
        result.to_delete.push(DiffEntry {
            endpoint_id,
            endpoint: None,
            metadata: Some(meta.clone()),
            changes: Vec::new(),
        });
    }

    tracing::debug!(
        create = result.to_create.len(),
        update = result.to_update.len(),
        skip = result.to_skip.len(),
        delete = result.to_delete.len(),
        "diff computed"
    );

    Ok(DiffOutcome { result, warnings })
}

fn index_metadata<'a>(
    metadata: &'a [TestFileMetadata],
    policy: DuplicatePolicy,
    warnings: &mut Vec<RunWarning>,
) -> Result<BTreeMap<EndpointId, &'a TestFileMetadata>> {
    let mut index: BTreeMap<EndpointId, &TestFileMetadata> = BTreeMap::new();

    for meta in metadata {
        let Some(existing) = index.get(&meta.endpoint_id).copied() else {
            index.insert(meta.endpoint_id.clone(), meta);
            continue;
        };

        let (kept, ignored) = match policy {
            DuplicatePolicy::LastWins => (meta, existing),
            DuplicatePolicy::FirstWins => (existing, meta),
            DuplicatePolicy::Reject => {
                return Err(ExError::new(ExErrorKind::DuplicateMetadata)
                    .with_op("diff")
                    .with_endpoint_id(meta.endpoint_id.to_string())
                    .with_file_path(meta.file_path.display().to_string())
                    .with_message(format!(
                        "also claimed by {}",
                        existing.file_path.display()
                    )));
            }
        };

        warnings.push(
            RunWarning::new(
                WarningKind::DuplicateMetadata,
                format!(
                    "several files claim this endpoint; using {} ({policy})",
                    kept.file_path.display()
                ),
            )
            .with_file(ignored.file_path.clone())
            .with_endpoint(meta.endpoint_id.clone()),
        );
        index.insert(meta.endpoint_id.clone(), kept);
    }

    Ok(index)
}

fn compare(endpoint: &Endpoint, meta: &TestFileMetadata) -> Vec<ChangeReason> {
    let mut changes = Vec::new();

    if endpoint.request_hash() != meta.request_schema_hash {
        changes.push(ChangeReason::RequestSchemaChanged);
    }

    let current = endpoint.response_hashes();
    for (status, hash) in &current {
        match meta.response_schema_hashes.get(status) {
            None => changes.push(ChangeReason::ResponseStatusAdded {
                status: status.clone(),
            }),
            Some(recorded) if recorded != hash => {
                changes.push(ChangeReason::ResponseSchemaChanged {
                    status: status.clone(),
                })
            }
            Some(_) => {}
        }
    }
    for status in meta.response_schema_hashes.keys() {
        if !current.contains_key(status) {
            changes.push(ChangeReason::ResponseStatusRemoved {
                status: status.clone(),
            });
        }
    }

    changes
}

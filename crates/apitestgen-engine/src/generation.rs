//! Generation/Update Engine
//!
//! Turns a classified diff into concrete file actions. Nothing is written
//! here: the plan is executed by the store (or printed on a dry run).
//!
//! A generated file has three ownership zones:
//! - the metadata header, rewritten on every update
//! - the negative-case region between the machine-owned markers, regenerated
//! - everything else, owned by the user and never touched

use apitestgen_core::diff::{DiffEntry, DiffResult};
use apitestgen_core::header::{replace_header, HeaderFields};
use apitestgen_core::mutation::MutationProvider;
use apitestgen_core::render::{
    file_name_for, find_region, render_negative_region, render_test_file, replace_region,
    suffixed_file_name_for, RenderContext,
};
use apitestgen_core::{Endpoint, FileAction, RunWarning, WarningKind};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Everything the engine needs besides the diff itself.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub repo_root: PathBuf,
    /// Relative to `repo_root`
    pub test_dir: PathBuf,
    pub file_extension: String,
    pub render: RenderContext,
    /// Injected so that output is reproducible
    pub generated_at: DateTime<Utc>,
    /// Files already present under the test dir (repository-relative)
    pub existing_files: BTreeSet<PathBuf>,
    /// Existing files with a malformed header; a create may overwrite them
    pub repairable: BTreeSet<PathBuf>,
}

/// Actions to execute plus the non-fatal problems met while planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    pub actions: Vec<FileAction>,
    pub warnings: Vec<RunWarning>,
}

/// Plan the file actions for one diff cycle.
///
/// Creates come first, then patches, then deletes. `to_skip` produces
/// nothing.
pub fn apply(
    diff: &DiffResult,
    provider: &dyn MutationProvider,
    ctx: &GenerationContext,
) -> GenerationPlan {
    let mut plan = GenerationPlan::default();
    let mut claimed: BTreeSet<PathBuf> = ctx
        .existing_files
        .difference(&ctx.repairable)
        .cloned()
        .collect();

    for entry in &diff.to_create {
        let Some(endpoint) = &entry.endpoint else {
            tracing::warn!(endpoint_id = %entry.endpoint_id, "create entry without endpoint");
            continue;
        };
        if let Some(action) = plan_create(endpoint, provider, ctx, &mut claimed, &mut plan) {
            plan.actions.push(action);
        }
    }

    for entry in &diff.to_update {
        match plan_update(entry, provider, ctx) {
            Ok(Some(action)) => plan.actions.push(action),
            Ok(None) => {}
            Err(warning) => plan.warnings.push(warning),
        }
    }

    for entry in &diff.to_delete {
        let Some(meta) = &entry.metadata else {
            continue;
        };
        plan.actions.push(FileAction::Delete {
            path: meta.file_path.clone(),
            endpoint_id: entry.endpoint_id.clone(),
        });
    }

    tracing::debug!(
        actions = plan.actions.len(),
        warnings = plan.warnings.len(),
        "generation plan ready"
    );
    plan
}

fn plan_create(
    endpoint: &Endpoint,
    provider: &dyn MutationProvider,
    ctx: &GenerationContext,
    claimed: &mut BTreeSet<PathBuf>,
    plan: &mut GenerationPlan,
) -> Option<FileAction> {
    let mut path = ctx
        .test_dir
        .join(file_name_for(&endpoint.id, &ctx.file_extension));

    if claimed.contains(&path) {
        let suffixed = ctx
            .test_dir
            .join(suffixed_file_name_for(&endpoint.id, &ctx.file_extension));
        if claimed.contains(&suffixed) {
            plan.warnings.push(
                RunWarning::new(
                    WarningKind::FilenameCollision,
                    "file name and its suffixed form are both taken; endpoint not generated",
                )
                .with_file(path)
                .with_endpoint(endpoint.id.clone()),
            );
            return None;
        }
        tracing::warn!(
            endpoint_id = %endpoint.id,
            file = %path.display(),
            "file name taken, using suffixed name"
        );
        plan.warnings.push(
            RunWarning::new(
                WarningKind::FilenameCollision,
                format!("file name taken, generated {} instead", suffixed.display()),
            )
            .with_file(path)
            .with_endpoint(endpoint.id.clone()),
        );
        path = suffixed;
    }
    if ctx.repairable.contains(&path) {
        tracing::debug!(
            endpoint_id = %endpoint.id,
            file = %path.display(),
            "regenerating file with malformed header"
        );
    }
    claimed.insert(path.clone());

    let header = HeaderFields::for_endpoint(endpoint, ctx.generated_at);
    let content = render_test_file(
        endpoint,
        &provider.negative_cases(endpoint),
        &provider.security_cases(endpoint),
        &header,
        &ctx.render,
    );

    Some(FileAction::Create {
        path,
        endpoint_id: endpoint.id.clone(),
        content,
    })
}

/// Rewrite the header and the marker region of an existing file in memory.
fn plan_update(
    entry: &DiffEntry,
    provider: &dyn MutationProvider,
    ctx: &GenerationContext,
) -> Result<Option<FileAction>, RunWarning> {
    let (Some(endpoint), Some(meta)) = (&entry.endpoint, &entry.metadata) else {
        tracing::warn!(endpoint_id = %entry.endpoint_id, "update entry without endpoint or metadata");
        return Ok(None);
    };
    let rel = &meta.file_path;

    let content = fs::read_to_string(ctx.repo_root.join(rel)).map_err(|e| {
        tracing::warn!(file = %rel.display(), error = %e, "cannot read file to update");
        RunWarning::new(WarningKind::UnreadableFile, e.to_string())
            .with_file(rel)
            .with_endpoint(endpoint.id.clone())
    })?;

    let unpatchable = |reason: String| {
        tracing::warn!(file = %rel.display(), reason = %reason, "file left untouched");
        RunWarning::new(
            WarningKind::UnpatchableMarkers,
            format!("{reason}; file left untouched"),
        )
        .with_file(rel)
        .with_endpoint(endpoint.id.clone())
    };

    // Markers are checked before anything is rewritten so a corrupted file
    // keeps its old header too.
    find_region(&content).map_err(|e| unpatchable(e.to_string()))?;

    let header = HeaderFields::for_endpoint(endpoint, ctx.generated_at);
    let with_header = replace_header(&content, &header);
    let region = render_negative_region(
        endpoint,
        &provider.negative_cases(endpoint),
        &provider.security_cases(endpoint),
    );
    let patched = replace_region(&with_header, &region).map_err(|e| unpatchable(e.to_string()))?;

    Ok(Some(FileAction::Patch {
        path: rel.clone(),
        endpoint_id: endpoint.id.clone(),
        content: patched,
    }))
}

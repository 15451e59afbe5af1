use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::{MANIFEST_PREFIX, OutputPaths};
use crate::model::ExtractRunManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let paths = OutputPaths::new(&args.output_dir);

    info!(output_dir = %args.output_dir.display(), "status requested");

    if let Some(manifest_path) = latest_manifest(&args.output_dir)? {
        let raw = fs::read(&manifest_path)
            .with_context(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: ExtractRunManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

        info!(
            path = %manifest_path.display(),
            run_id = %manifest.run_id,
            status = %manifest.status,
            current_step = %manifest.current_step,
            failed_step = %manifest.failed_step.unwrap_or_default(),
            failure_reason = %manifest.failure_reason.unwrap_or_default(),
            started_at = %manifest.started_at,
            updated_at = %manifest.updated_at,
            command = %manifest.command,
            "loaded extract run manifest"
        );
        info!(
            total_pages = manifest.counts.total_pages,
            extracted_pages = manifest.counts.extracted_pages,
            toc_entries = manifest.counts.toc_entries,
            sections = manifest.counts.sections,
            listed_tables = manifest.counts.listed_tables,
            missing_in_spec = manifest.counts.missing_in_spec,
            extra_in_spec = manifest.counts.extra_in_spec,
            order_mismatches = manifest.counts.order_mismatches,
            toc_gaps = manifest.counts.toc_gaps,
            section_gaps = manifest.counts.section_gaps,
            toc_rejected = manifest.diagnostics.toc_rejected_total(),
            heading_rejected = manifest.diagnostics.heading_rejected_total(),
            "extract counts"
        );
        for warning in &manifest.warnings {
            warn!(warning = %warning, "recorded run warning");
        }
    } else {
        warn!(output_dir = %args.output_dir.display(), "no extract run manifest found");
    }

    for (artifact, path) in paths.artifacts() {
        if path.exists() {
            info!(artifact, path = %path.display(), "artifact present");
        } else {
            warn!(artifact, path = %path.display(), "artifact missing");
        }
    }

    Ok(())
}

/// Manifest names carry a compact UTC timestamp, so the greatest name is the
/// most recent run.
fn latest_manifest(output_dir: &Path) -> Result<Option<PathBuf>> {
    if !output_dir.exists() {
        return Ok(None);
    }

    let mut latest: Option<PathBuf> = None;
    for entry in fs::read_dir(output_dir)
        .with_context(|| format!("failed to list {}", output_dir.display()))?
    {
        let entry = entry.with_context(|| format!("failed to list {}", output_dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(MANIFEST_PREFIX) || !name.ends_with(".json") {
            continue;
        }

        let path = entry.path();
        if latest.as_ref().is_none_or(|current| path.file_name() > current.file_name()) {
            latest = Some(path);
        }
    }

    Ok(latest)
}

//! Implementation of `cppbuild discover`.
//!
//! Resolves a manifest without generating anything and writes a JSON
//! description of every target reached.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::target::TargetKind;
use crate::generator::{GeneratorKind, Toolchain};
use crate::ops::generate::resolve;
use crate::util::fs::{ensure_dir, write_atomic};

/// Options for the discover command.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Root manifest
    pub manifest: PathBuf,

    /// Where the JSON metadata is written
    pub output: PathBuf,

    /// Output directory artifacts are predicted under
    pub out_dir: PathBuf,

    /// Backend whose artifact layout is predicted
    pub generator: GeneratorKind,

    /// Extra directories searched for named packages
    pub search_paths: Vec<PathBuf>,
}

/// Metadata for one target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TargetKind,
    pub origin: PathBuf,
    /// Declared by the root manifest rather than reached through a link
    pub root: bool,
    pub depends_on: Vec<String>,
    pub wave: usize,
    /// Predicted artifact; absent for interface targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

/// Everything `discover` writes.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverReport {
    pub manifest: PathBuf,
    pub generator: GeneratorKind,
    pub targets: Vec<TargetMetadata>,
}

/// Resolve `opts.manifest` and write its metadata to `opts.output`.
pub fn discover(opts: &DiscoverOptions) -> Result<DiscoverReport> {
    let generator = opts
        .generator
        .create(opts.out_dir.clone(), Toolchain::default());
    let resolved = resolve(&opts.manifest, opts.search_paths.clone(), &*generator)?;

    let registry = &resolved.registry;
    let mut targets = Vec::with_capacity(registry.len());
    for (wave, ids) in resolved.schedule.iter().enumerate() {
        for &id in ids {
            let target = &registry[id];
            targets.push(TargetMetadata {
                name: target.name.clone(),
                kind: target.kind,
                origin: target.origin_script_path().to_path_buf(),
                root: resolved.roots.contains(&id),
                depends_on: target
                    .depends_on
                    .iter()
                    .map(|dep| registry[*dep].name.clone())
                    .collect(),
                wave,
                artifact: target
                    .kind
                    .has_artifact()
                    .then(|| generator.predict_output_path(target)),
            });
        }
    }

    let report = DiscoverReport {
        manifest: opts.manifest.clone(),
        generator: opts.generator,
        targets,
    };

    write_report(&report, &opts.output)?;
    Ok(report)
}

fn write_report(report: &DiscoverReport, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        ensure_dir(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let mut json = serde_json::to_string_pretty(report).context("failed to serialize metadata")?;
    json.push('\n');

    write_atomic(output, &json)
        .with_context(|| format!("failed to write metadata: {}", output.display()))
}

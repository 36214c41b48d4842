//! Implementation of `cppbuild build`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::errors::EngineResult;
use crate::core::target::TargetId;
use crate::generator::{Generator, GeneratorKind, Toolchain};
use crate::ops::driver::{BuildDriver, GenerateReport};
use crate::resolver::{DependencyResolver, ManifestLocator, Schedule, TargetRegistry};

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Root manifest (file, or directory containing `CppBuild.toml`)
    pub manifest: PathBuf,

    /// Absolute output directory
    pub out_dir: PathBuf,

    /// Backend
    pub generator: GeneratorKind,

    /// Commands written into generated files
    pub toolchain: Toolchain,

    /// Extra directories searched for named packages
    pub search_paths: Vec<PathBuf>,
}

/// A fully resolved project.
#[derive(Debug)]
pub struct Resolved {
    pub registry: TargetRegistry,
    pub schedule: Schedule,
    /// Targets declared by the root manifest
    pub roots: Vec<TargetId>,
}

/// Load `manifest`, register everything it reaches, and resolve links.
pub fn resolve(
    manifest: &Path,
    search_paths: Vec<PathBuf>,
    generator: &dyn Generator,
) -> EngineResult<Resolved> {
    let mut resolver = DependencyResolver::new(ManifestLocator::new(search_paths));
    let roots = resolver.register_manifest(manifest, None)?;
    let schedule = resolver.resolve_links(generator)?;

    tracing::info!(
        "resolved {} targets in {} waves",
        resolver.registry().len(),
        schedule.len()
    );

    Ok(Resolved {
        registry: resolver.into_registry(),
        schedule,
        roots,
    })
}

/// Generate build files for `opts.manifest` into `opts.out_dir`.
pub fn generate(opts: &GenerateOptions) -> Result<GenerateReport> {
    let mut generator = opts
        .generator
        .create(opts.out_dir.clone(), opts.toolchain.clone());

    let resolved = resolve(&opts.manifest, opts.search_paths.clone(), &*generator)?;
    let name = root_name(&opts.manifest);

    let report = BuildDriver::new(&resolved.registry, &mut *generator).generate_all(
        &resolved.schedule,
        &opts.out_dir,
        &name,
    )?;

    Ok(report)
}

/// Name of the root group: the directory holding the root manifest.
fn root_name(manifest: &Path) -> String {
    let dir = if manifest.is_dir() {
        Some(manifest)
    } else {
        manifest.parent()
    };
    dir.and_then(|d| d.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string())
}

//! CppBuild.toml manifest parsing and normalization.
//!
//! A manifest evaluates to either one target or an ordered group of targets:
//!
//! ```toml
//! # single target
//! name = "app"
//! type = "application"
//! files = ["src/main.cpp"]
//! link = ["core"]
//! ```
//!
//! ```toml
//! # group
//! include = ["third_party/fmt/CppBuild.toml"]
//!
//! [[target]]
//! name = "core"
//! type = "static-library"
//! includeDirectories = { public = ["include"] }
//! ```
//!
//! Property bags and links are folded into their canonical shapes here, so
//! nothing past this module needs to inspect the shape they were written in.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::{EngineError, EngineResult};
use crate::core::link::{LinkReference, RawLink};
use crate::core::property::{normalize_bag, RawPropertyBag};
use crate::core::target::{Target, TargetKind};
use crate::util::fs::absolutize;

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "CppBuild.toml";

/// A target descriptor as written in a manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawTarget {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub include_directories: Option<RawPropertyBag>,

    #[serde(default)]
    pub linker_directories: Option<RawPropertyBag>,

    #[serde(default)]
    pub compiler_flags: Option<RawPropertyBag>,

    #[serde(default)]
    pub definitions: Option<RawPropertyBag>,

    #[serde(default)]
    pub linker_flags: Option<RawPropertyBag>,

    #[serde(default)]
    pub link: Vec<RawLink>,

    /// Manifest that declared this target; first tag wins
    #[serde(skip)]
    pub origin: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    #[serde(default)]
    include: Vec<String>,

    #[serde(default)]
    target: Vec<RawTarget>,
}

/// Parsed but not yet normalized manifest.
#[derive(Debug)]
enum RawManifest {
    Single(RawTarget),
    Group(Vec<RawTarget>),
}

impl RawManifest {
    fn targets_mut(&mut self) -> &mut [RawTarget] {
        match self {
            RawManifest::Single(target) => std::slice::from_mut(target),
            RawManifest::Group(targets) => targets,
        }
    }
}

/// The result of evaluating a manifest.
#[derive(Debug, Clone)]
pub enum LoadedManifest {
    /// The manifest declares exactly one target
    Single(Target),
    /// The manifest declares an ordered group of targets
    Group(Vec<Target>),
}

impl LoadedManifest {
    /// All targets, in declaration order.
    pub fn targets(&self) -> &[Target] {
        match self {
            LoadedManifest::Single(target) => std::slice::from_ref(target),
            LoadedManifest::Group(targets) => targets,
        }
    }

    /// Consume into the list of targets.
    pub fn into_targets(self) -> Vec<Target> {
        match self {
            LoadedManifest::Single(target) => vec![target],
            LoadedManifest::Group(targets) => targets,
        }
    }

    /// Find a target by name.
    pub fn find(&self, name: &str) -> Option<&Target> {
        self.targets().iter().find(|t| t.name == name)
    }

    /// Check if this manifest is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, LoadedManifest::Group(_))
    }
}

/// Locate the manifest file a path refers to.
///
/// Accepts a manifest file, a directory containing [`MANIFEST_NAME`], or an
/// extension-less path whose `.toml` sibling exists. Returns the canonical
/// absolute path.
pub fn resolve_manifest_file(path: &Path) -> Option<PathBuf> {
    let candidate = if path.is_file() {
        path.to_path_buf()
    } else if path.is_dir() {
        path.join(MANIFEST_NAME)
    } else if path.extension().is_none() {
        path.with_extension("toml")
    } else {
        return None;
    };

    if candidate.is_file() {
        candidate.canonicalize().ok()
    } else {
        None
    }
}

/// Loads manifests and normalizes the targets they declare.
///
/// Loaded manifests are cached by canonical path, so repeated lookups of the
/// same manifest during dependency resolution parse it once.
#[derive(Debug, Default)]
pub struct ManifestLoader {
    cache: HashMap<PathBuf, LoadedManifest>,
}

impl ManifestLoader {
    /// Create a new loader with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the manifest at `path`.
    ///
    /// Relative paths are resolved against `search_context` when given,
    /// otherwise against the process working directory.
    pub fn load(
        &mut self,
        path: &Path,
        search_context: Option<&Path>,
    ) -> EngineResult<LoadedManifest> {
        let requested = match search_context {
            Some(dir) => absolutize(dir, path),
            None => std::env::current_dir()
                .map(|cwd| absolutize(&cwd, path))
                .map_err(|e| EngineError::manifest_load(path, e))?,
        };

        let resolved = resolve_manifest_file(&requested).ok_or_else(|| {
            EngineError::manifest_load(&requested, "no manifest found at this path")
        })?;

        if let Some(cached) = self.cache.get(&resolved) {
            return Ok(cached.clone());
        }

        tracing::debug!("loading manifest {}", resolved.display());

        let mut stack = Vec::new();
        let raw = load_raw(&resolved, &mut stack)?;
        let loaded = normalize_manifest(raw, &resolved)?;

        self.cache.insert(resolved, loaded.clone());
        Ok(loaded)
    }
}

/// Parse a manifest, pull in its includes, and tag every target with its
/// declaring manifest.
fn load_raw(path: &Path, stack: &mut Vec<PathBuf>) -> EngineResult<RawManifest> {
    if stack.iter().any(|p| p == path) {
        return Err(EngineError::manifest_load(
            path,
            format!(
                "include cycle: {}",
                stack
                    .iter()
                    .chain(std::iter::once(&path.to_path_buf()))
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            ),
        ));
    }

    let contents = fs::read_to_string(path).map_err(|e| EngineError::manifest_load(path, e))?;
    let table: toml::Table =
        toml::from_str(&contents).map_err(|e| EngineError::manifest_load(path, e))?;

    let mut manifest = if table.contains_key("target") || table.contains_key("include") {
        let group: RawGroup = toml::Value::Table(table)
            .try_into()
            .map_err(|e| EngineError::manifest_load(path, e))?;

        stack.push(path.to_path_buf());
        let mut members = Vec::new();
        let dir = path.parent().unwrap_or(Path::new("/"));
        for include in &group.include {
            let included_path =
                resolve_manifest_file(&absolutize(dir, include)).ok_or_else(|| {
                    let reason = format!("included manifest `{}` not found", include);
                    EngineError::manifest_load(path, reason)
                })?;
            let included = load_raw(&included_path, stack)?;
            match included {
                RawManifest::Single(target) => members.push(target),
                RawManifest::Group(targets) => members.extend(targets),
            }
        }
        stack.pop();

        members.extend(group.target);
        RawManifest::Group(members)
    } else if table.contains_key("name") {
        let target: RawTarget = toml::Value::Table(table)
            .try_into()
            .map_err(|e| EngineError::manifest_load(path, e))?;
        RawManifest::Single(target)
    } else {
        return Err(EngineError::manifest_load(
            path,
            "manifest declares neither a target (`name = ...`) nor a group (`[[target]]`)",
        ));
    };

    apply_origin(&mut manifest, path);
    Ok(manifest)
}

/// Tag untagged targets with `path`. Targets already tagged by a nested
/// manifest keep their tag.
fn apply_origin(manifest: &mut RawManifest, path: &Path) {
    for target in manifest.targets_mut() {
        if target.origin.is_none() {
            target.origin = Some(path.to_path_buf());
        }
    }
}

fn normalize_manifest(raw: RawManifest, path: &Path) -> EngineResult<LoadedManifest> {
    match raw {
        RawManifest::Single(target) => Ok(LoadedManifest::Single(normalize(target, path)?)),
        RawManifest::Group(targets) => {
            let targets = targets
                .into_iter()
                .map(|t| normalize(t, path))
                .collect::<EngineResult<Vec<_>>>()?;

            let mut seen = HashSet::new();
            for target in &targets {
                if !seen.insert(target.key()) {
                    return Err(EngineError::manifest_load(
                        target.origin_script_path(),
                        format!("target `{}` is declared more than once", target.name),
                    ));
                }
            }
            Ok(LoadedManifest::Group(targets))
        }
    }
}

/// Target names become output directory names, so they must be a single
/// plain path component.
fn validate_name(name: &str, origin: &Path) -> EngineResult<()> {
    let reason = if name.is_empty() {
        "target name must not be empty"
    } else if name == "." || name == ".." {
        "target name must not be `.` or `..`"
    } else if name.contains(['/', '\\']) {
        "target name must not contain path separators"
    } else {
        return Ok(());
    };

    Err(EngineError::manifest_load(
        origin,
        format!("invalid target name `{}`: {}", name, reason),
    ))
}

/// Convert a raw descriptor into a canonical [`Target`].
///
/// `fallback_origin` is used only if the descriptor was never tagged.
pub fn normalize(raw: RawTarget, fallback_origin: &Path) -> EngineResult<Target> {
    let origin = raw
        .origin
        .unwrap_or_else(|| fallback_origin.to_path_buf());
    validate_name(&raw.name, &origin)?;

    let kind = match raw.kind.as_deref() {
        None => TargetKind::default(),
        Some(value) => value
            .parse::<TargetKind>()
            .map_err(|value| EngineError::InvalidTargetType {
                value,
                target: raw.name.clone(),
                manifest: origin.clone(),
            })?,
    };

    let origin_str = origin.to_string_lossy().into_owned();
    let mut target = Target::new(raw.name, kind, origin).with_files(raw.files);
    target.include_directories = normalize_bag(raw.include_directories);
    target.linker_directories = normalize_bag(raw.linker_directories);
    target.compiler_flags = normalize_bag(raw.compiler_flags);
    target.definitions = normalize_bag(raw.definitions);
    target.linker_flags = normalize_bag(raw.linker_flags);
    target.link = raw
        .link
        .into_iter()
        .map(|l| LinkReference::from_raw(l, &origin_str))
        .collect();

    Ok(target)
}

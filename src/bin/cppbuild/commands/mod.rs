//! Command implementations

pub mod build;
pub mod completions;
pub mod discover;

use std::path::{Path, PathBuf};

use anyhow::Result;
use cppbuild::core::manifest::resolve_manifest_file;
use cppbuild::GlobalContext;

/// Manifest named on the command line, or the nearest one above the cwd.
pub fn manifest_path(arg: Option<&Path>, ctx: &GlobalContext) -> Result<PathBuf> {
    let Some(path) = arg else {
        return ctx.find_manifest();
    };

    let path = ctx.resolve_path(path);
    resolve_manifest_file(&path)
        .ok_or_else(|| anyhow::anyhow!("no manifest found at `{}`", path.display()))
}

/// Directory project configuration is read from: the manifest's directory.
pub fn project_root(manifest: &Path) -> &Path {
    manifest.parent().unwrap_or(manifest)
}

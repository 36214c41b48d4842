//! Global context for CppBuild operations.
//!
//! Holds the working directory, user configuration paths and color
//! preference shared by every command.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::MANIFEST_NAME;
use crate::util::config::{self, Config};

/// Context passed from the CLI into operations.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Global config directory (~/.cppbuild), if a home directory exists
    home: Option<PathBuf>,

    /// Colored diagnostics
    color: bool,
}

impl GlobalContext {
    /// Create a context for the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context rooted at `cwd`.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            home: config::global_config_dir(),
            color: std::io::stderr().is_terminal(),
        }
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Global config file (~/.cppbuild/config.toml).
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join("config.toml"))
    }

    /// Project config file for the project rooted at `project_root`.
    pub fn project_config_path(&self, project_root: &Path) -> PathBuf {
        config::project_config_path(project_root)
    }

    /// Load the merged configuration for the project rooted at `project_root`.
    pub fn load_config(&self, project_root: &Path) -> Config {
        config::load_config(
            self.global_config_path().as_deref(),
            &self.project_config_path(project_root),
        )
    }

    /// Resolve a user-supplied path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::util::fs::absolutize(&self.cwd, path)
    }

    /// Find the nearest manifest, searching upward from the working directory.
    pub fn find_manifest(&self) -> Result<PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(MANIFEST_NAME))
            .find(|candidate| candidate.is_file())
            .with_context(|| {
                format!(
                    "could not find `{}` in `{}` or any parent directory",
                    MANIFEST_NAME,
                    self.cwd.display()
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_manifest_walks_up() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&manifest, "name = \"app\"\n").unwrap();
        let nested = tmp.path().join("src/deep");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested);
        assert_eq!(ctx.find_manifest().unwrap(), manifest);
    }

    #[test]
    fn test_find_manifest_missing() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf());
        let err = ctx.find_manifest().unwrap_err();
        assert!(err.to_string().contains(MANIFEST_NAME));
    }

    #[test]
    fn test_resolve_path() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work/proj"));
        assert_eq!(ctx.resolve_path(Path::new("out")), PathBuf::from("/work/proj/out"));
        assert_eq!(ctx.resolve_path(Path::new("/abs")), PathBuf::from("/abs"));
    }
}

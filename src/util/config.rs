//! Configuration file support for CppBuild.
//!
//! CppBuild reads two configuration files:
//! - Global: `~/.cppbuild/config.toml` - User-wide defaults
//! - Project: `.cppbuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::generator::{GeneratorKind, Toolchain};
use crate::util::fs::absolutize;

/// Name of the per-user and per-project configuration directory.
pub const CONFIG_DIR: &str = ".cppbuild";

/// CppBuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation settings
    pub build: BuildConfig,

    /// Commands written into generated build files
    pub toolchain: ToolchainSettings,

    /// Link resolution settings
    pub resolve: ResolveConfig,
}

/// Generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default backend (make, premake5)
    pub generator: Option<GeneratorKind>,

    /// Default output directory
    pub out_dir: Option<PathBuf>,
}

/// Toolchain overrides for generated build files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler command (e.g., clang)
    pub cc: Option<String>,

    /// C++ compiler command (e.g., clang++)
    pub cxx: Option<String>,

    /// Archiver command (e.g., llvm-ar)
    pub ar: Option<String>,
}

/// Link resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Extra directories searched for named packages, after `cpp_modules`
    pub search_paths: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Relative paths in the file are anchored at the directory holding the
    /// `.cppbuild` directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent().and_then(Path::parent) {
            config.anchor(base);
        }
        Ok(config)
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    fn anchor(&mut self, base: &Path) {
        if let Some(out_dir) = &self.build.out_dir {
            self.build.out_dir = Some(absolutize(base, out_dir));
        }
        for path in &mut self.resolve.search_paths {
            *path = absolutize(base, &*path);
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }

        if other.toolchain.cc.is_some() {
            self.toolchain.cc = other.toolchain.cc;
        }
        if other.toolchain.cxx.is_some() {
            self.toolchain.cxx = other.toolchain.cxx;
        }
        if other.toolchain.ar.is_some() {
            self.toolchain.ar = other.toolchain.ar;
        }

        // project search paths are tried first
        if !other.resolve.search_paths.is_empty() {
            let mut paths = other.resolve.search_paths;
            paths.append(&mut self.resolve.search_paths);
            self.resolve.search_paths = paths;
        }
    }

    /// Toolchain with unset commands filled in from the defaults.
    pub fn toolchain(&self) -> Toolchain {
        let defaults = Toolchain::default();
        Toolchain {
            cc: self.toolchain.cc.clone().unwrap_or(defaults.cc),
            cxx: self.toolchain.cxx.clone().unwrap_or(defaults.cxx),
            ar: self.toolchain.ar.clone().unwrap_or(defaults.ar),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cppbuild/config.toml)
/// 2. Global config (~/.cppbuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));
    config
}

/// Get the global config directory (~/.cppbuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the project config path (.cppbuild/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join("config.toml")
}

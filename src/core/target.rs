//! Target definitions - what gets built.
//!
//! A Target represents a buildable unit: an application, a static or dynamic
//! library, or an interface marker that produces no artifact at all.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::link::LinkReference;
use crate::core::property::{PropertyBag, PropertyKind};

/// The kind of target being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// Executable binary
    Application,

    /// Header-only / usage-requirements-only target, nothing is compiled
    Interface,

    /// Static library archive
    StaticLibrary,

    /// Shared/dynamic library
    DynamicLibrary,
}

impl Default for TargetKind {
    fn default() -> Self {
        TargetKind::Application
    }
}

impl TargetKind {
    /// Get the canonical manifest spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Application => "application",
            TargetKind::Interface => "interface",
            TargetKind::StaticLibrary => "static-library",
            TargetKind::DynamicLibrary => "dynamic-library",
        }
    }

    /// Check if this produces a compiled artifact.
    pub fn has_artifact(&self) -> bool {
        !matches!(self, TargetKind::Interface)
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "application" | "app" | "executable" | "exe" => Ok(TargetKind::Application),
            "interface" => Ok(TargetKind::Interface),
            "static-library" | "staticlibrary" | "staticlib" | "static" => {
                Ok(TargetKind::StaticLibrary)
            }
            "dynamic-library" | "dynamiclibrary" | "sharedlib" | "shared" | "dylib"
            | "dynamic" => Ok(TargetKind::DynamicLibrary),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a target inside a [`TargetRegistry`](crate::resolver::TargetRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TargetId(pub(crate) usize);

impl TargetId {
    /// Get the raw index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a target: its name plus the manifest that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    pub name: String,
    pub origin: PathBuf,
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.origin.display())
    }
}

/// A normalized build target.
#[derive(Debug, Clone)]
pub struct Target {
    /// Target name
    pub name: String,

    /// What kind of artifact to produce
    pub kind: TargetKind,

    /// Source files, in declaration order, relative to the origin directory
    pub files: Vec<String>,

    /// Include directories (-I)
    pub include_directories: PropertyBag,

    /// Library search directories (-L)
    pub linker_directories: PropertyBag,

    /// Extra compiler flags
    pub compiler_flags: PropertyBag,

    /// Preprocessor definitions (-D)
    pub definitions: PropertyBag,

    /// Extra linker flags
    pub linker_flags: PropertyBag,

    /// Declared links; drained by link resolution
    pub link: Vec<LinkReference>,

    /// Resolved link list: predicted artifact paths and system library names
    pub resolved_link: Vec<String>,

    /// Registered targets this one depends on
    pub depends_on: Vec<TargetId>,

    /// Absolute path of the declaring manifest
    origin_script_path: PathBuf,
}

impl Target {
    /// Create a new target declared by the manifest at `origin_script_path`.
    pub fn new(
        name: impl Into<String>,
        kind: TargetKind,
        origin_script_path: impl Into<PathBuf>,
    ) -> Self {
        Target {
            name: name.into(),
            kind,
            files: Vec::new(),
            include_directories: PropertyBag::default(),
            linker_directories: PropertyBag::default(),
            compiler_flags: PropertyBag::default(),
            definitions: PropertyBag::default(),
            linker_flags: PropertyBag::default(),
            link: Vec::new(),
            resolved_link: Vec::new(),
            depends_on: Vec::new(),
            origin_script_path: origin_script_path.into(),
        }
    }

    /// Add source files.
    pub fn with_files(mut self, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Replace one property bag.
    pub fn with_bag(mut self, kind: PropertyKind, bag: PropertyBag) -> Self {
        *self.bag_mut(kind) = bag;
        self
    }

    /// Add a link reference.
    pub fn with_link(mut self, link: LinkReference) -> Self {
        self.link.push(link);
        self
    }

    /// Identity of this target.
    pub fn key(&self) -> TargetKey {
        TargetKey {
            name: self.name.clone(),
            origin: self.origin_script_path.clone(),
        }
    }

    /// Absolute path of the declaring manifest.
    pub fn origin_script_path(&self) -> &Path {
        &self.origin_script_path
    }

    /// Directory of the declaring manifest.
    pub fn origin_dir(&self) -> &Path {
        self.origin_script_path.parent().unwrap_or(Path::new("/"))
    }

    /// Get a property bag by kind.
    pub fn bag(&self, kind: PropertyKind) -> &PropertyBag {
        match kind {
            PropertyKind::IncludeDirectories => &self.include_directories,
            PropertyKind::LinkerDirectories => &self.linker_directories,
            PropertyKind::CompilerFlags => &self.compiler_flags,
            PropertyKind::Definitions => &self.definitions,
            PropertyKind::LinkerFlags => &self.linker_flags,
        }
    }

    /// Get a mutable property bag by kind.
    pub fn bag_mut(&mut self, kind: PropertyKind) -> &mut PropertyBag {
        match kind {
            PropertyKind::IncludeDirectories => &mut self.include_directories,
            PropertyKind::LinkerDirectories => &mut self.linker_directories,
            PropertyKind::CompilerFlags => &mut self.compiler_flags,
            PropertyKind::Definitions => &mut self.definitions,
            PropertyKind::LinkerFlags => &mut self.linker_flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_kind_parsing() {
        assert_eq!("application".parse::<TargetKind>(), Ok(TargetKind::Application));
        assert_eq!("StaticLibrary".parse::<TargetKind>(), Ok(TargetKind::StaticLibrary));
        assert_eq!("static_library".parse::<TargetKind>(), Ok(TargetKind::StaticLibrary));
        assert_eq!("shared".parse::<TargetKind>(), Ok(TargetKind::DynamicLibrary));
        assert_eq!("Interface".parse::<TargetKind>(), Ok(TargetKind::Interface));
        assert_eq!("plugin".parse::<TargetKind>(), Err("plugin".to_string()));
    }

    #[test]
    fn test_identity() {
        let a = Target::new("core", TargetKind::StaticLibrary, "/a/CppBuild.toml");
        let b = Target::new("core", TargetKind::StaticLibrary, "/b/CppBuild.toml");

        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), a.clone().key());
        assert_eq!(a.origin_dir(), Path::new("/a"));
    }

    #[test]
    fn test_bag_access() {
        let target = Target::new("app", TargetKind::Application, "/p/CppBuild.toml")
            .with_bag(PropertyKind::Definitions, PropertyBag::public(["NDEBUG"]));

        assert_eq!(target.bag(PropertyKind::Definitions).public, vec!["NDEBUG"]);
        assert!(target.bag(PropertyKind::CompilerFlags).is_empty());
    }
}

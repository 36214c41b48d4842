//! Build file generators.
//!
//! A [`Generator`] turns one node of the build graph into the text of a
//! backend build file. Leaf nodes are single targets; group nodes fan out
//! into their members' subdirectories. Generators also predict where a
//! target's artifact will land, which the resolver needs before anything is
//! generated.

pub mod make;
pub mod premake;
pub mod quote;

pub use make::{MakeGenerator, Toolchain};
pub use premake::PremakeGenerator;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::EngineResult;
use crate::core::property::PropertyBag;
use crate::core::target::{Target, TargetKind};
use crate::util::fs::absolutize;

/// Contract every backend implements.
pub trait Generator {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Well-known file name the backend's tool reads (e.g. `Makefile`).
    fn build_file_name(&self) -> &'static str;

    /// Generate the build file for a target or a group.
    fn generate(&self, node: &BuildNode<'_>) -> EngineResult<GeneratedFile>;

    /// Absolute path of the artifact `target` will produce.
    ///
    /// Depends only on the output root, the target's name and its kind.
    fn predict_output_path(&self, target: &Target) -> PathBuf;

    /// Directory relative source paths are resolved against.
    fn working_directory(&self) -> &Path;

    /// Set the working directory for the next `generate` call.
    fn set_working_directory(&mut self, dir: PathBuf);
}

/// Text of one generated build file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub content: String,
}

impl GeneratedFile {
    pub fn new(content: impl Into<String>) -> Self {
        GeneratedFile {
            content: content.into(),
        }
    }
}

/// A node handed to [`Generator::generate`].
#[derive(Debug, Clone)]
pub enum BuildNode<'a> {
    /// One target, generated in its own directory
    Leaf(&'a Target),
    /// A directory fanning out to member subdirectories
    Group(Group<'a>),
}

impl BuildNode<'_> {
    /// Name of the target or group.
    pub fn name(&self) -> &str {
        match self {
            BuildNode::Leaf(target) => &target.name,
            BuildNode::Group(group) => &group.name,
        }
    }
}

/// A group of members, each living in a subdirectory named after it.
#[derive(Debug, Clone, Default)]
pub struct Group<'a> {
    pub name: String,
    /// Members in an order where every member follows its dependencies
    pub members: Vec<GroupMember<'a>>,
}

/// One member of a [`Group`].
#[derive(Debug, Clone)]
pub struct GroupMember<'a> {
    /// Subdirectory name
    pub name: &'a str,
    /// Other members of the same group this one must be built after
    pub depends_on: Vec<&'a str>,
}

/// Sets a generator's working directory and restores the previous one when
/// dropped.
pub struct WorkingDirGuard<'g, G: Generator + ?Sized> {
    generator: &'g mut G,
    previous: PathBuf,
}

impl<'g, G: Generator + ?Sized> WorkingDirGuard<'g, G> {
    pub fn new(generator: &'g mut G, dir: PathBuf) -> Self {
        let previous = generator.working_directory().to_path_buf();
        generator.set_working_directory(dir);
        WorkingDirGuard {
            generator,
            previous,
        }
    }
}

impl<G: Generator + ?Sized> Deref for WorkingDirGuard<'_, G> {
    type Target = G;

    fn deref(&self) -> &G {
        &*self.generator
    }
}

impl<G: Generator + ?Sized> DerefMut for WorkingDirGuard<'_, G> {
    fn deref_mut(&mut self) -> &mut G {
        &mut *self.generator
    }
}

impl<G: Generator + ?Sized> Drop for WorkingDirGuard<'_, G> {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        self.generator.set_working_directory(previous);
    }
}

/// Available backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// GNU Make
    #[default]
    Make,
    /// Premake5 Lua scripts
    Premake5,
}

impl GeneratorKind {
    /// Instantiate the backend, predicting artifacts under `output_root`.
    pub fn create(self, output_root: PathBuf, toolchain: Toolchain) -> Box<dyn Generator> {
        match self {
            GeneratorKind::Make => Box::new(MakeGenerator::new(output_root, toolchain)),
            GeneratorKind::Premake5 => Box::new(PremakeGenerator::new(output_root)),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorKind::Make => write!(f, "make"),
            GeneratorKind::Premake5 => write!(f, "premake5"),
        }
    }
}

/// Artifact location shared by the bundled backends: `<root>/<name>/<name>`
/// with a `.a` or `.so` suffix for libraries. Interface targets produce no
/// file, so their directory stands in for it.
pub fn artifact_path(output_root: &Path, target: &Target) -> PathBuf {
    let dir = output_root.join(&target.name);
    match target.kind {
        TargetKind::Application => dir.join(&target.name),
        TargetKind::StaticLibrary => dir.join(format!("{}.a", target.name)),
        TargetKind::DynamicLibrary => dir.join(format!("{}.so", target.name)),
        TargetKind::Interface => dir,
    }
}

/// Source and directory values a backend emits for one target.
///
/// Properties are the target's `public ++ private` view; interface entries
/// never reach the target itself. Relative directories are resolved against
/// `base`.
#[derive(Debug, Clone, Default)]
pub(crate) struct MergedProperties {
    pub include_directories: Vec<String>,
    pub linker_directories: Vec<String>,
    pub compiler_flags: Vec<String>,
    pub definitions: Vec<String>,
    pub linker_flags: Vec<String>,
}

impl MergedProperties {
    pub(crate) fn of(target: &Target, base: &Path) -> Self {
        let dirs = |bag: &PropertyBag| {
            bag.effective()
                .map(|d| absolutize(base, d).to_string_lossy().into_owned())
                .collect()
        };
        let values = |bag: &PropertyBag| bag.effective().cloned().collect();

        MergedProperties {
            include_directories: dirs(&target.include_directories),
            linker_directories: dirs(&target.linker_directories),
            compiler_flags: values(&target.compiler_flags),
            definitions: values(&target.definitions),
            linker_flags: values(&target.linker_flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property::PropertyKind;
    use crate::test_support::RecordingGenerator;

    #[test]
    fn test_guard_restores_on_drop() {
        let mut generator = RecordingGenerator::new("/out");
        generator.set_working_directory(PathBuf::from("/outer"));

        {
            let guard = WorkingDirGuard::new(&mut generator, PathBuf::from("/inner"));
            assert_eq!(guard.working_directory(), Path::new("/inner"));
        }

        assert_eq!(generator.working_directory(), Path::new("/outer"));
    }

    #[test]
    fn test_guard_restores_on_unwind() {
        let mut generator = RecordingGenerator::new("/out");
        generator.set_working_directory(PathBuf::from("/outer"));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = WorkingDirGuard::new(&mut generator, PathBuf::from("/inner"));
            panic!("generation failed");
        }));

        assert!(result.is_err());
        assert_eq!(generator.working_directory(), Path::new("/outer"));
    }

    #[test]
    fn test_merged_properties_skip_interface() {
        let target = Target::new("core", TargetKind::StaticLibrary, "/p/CppBuild.toml")
            .with_bag(
                PropertyKind::IncludeDirectories,
                PropertyBag {
                    public: vec!["include".into()],
                    private: vec!["src".into()],
                    interface: vec!["api".into()],
                },
            )
            .with_bag(PropertyKind::Definitions, PropertyBag::interface(["USE_CORE"]));

        let merged = MergedProperties::of(&target, Path::new("/p"));
        assert_eq!(merged.include_directories, vec!["/p/include", "/p/src"]);
        assert!(merged.definitions.is_empty());
    }

    #[test]
    fn test_artifact_path_by_kind() {
        let root = Path::new("/out");
        let path = |kind| artifact_path(root, &Target::new("core", kind, "/p/CppBuild.toml"));

        assert_eq!(path(TargetKind::Application), PathBuf::from("/out/core/core"));
        assert_eq!(path(TargetKind::StaticLibrary), PathBuf::from("/out/core/core.a"));
        assert_eq!(path(TargetKind::DynamicLibrary), PathBuf::from("/out/core/core.so"));
        assert_eq!(path(TargetKind::Interface), PathBuf::from("/out/core"));
    }

    #[test]
    fn test_created_backend_matches_kind() {
        for kind in [GeneratorKind::Make, GeneratorKind::Premake5] {
            let generator = kind.create(PathBuf::from("/out"), Toolchain::default());
            assert_eq!(generator.name(), kind.to_string());
        }
    }
}

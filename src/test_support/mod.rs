//! Test utilities for CppBuild unit tests.
//!
//! Provides on-disk project fixtures and a recording generator so engine
//! tests can run against real manifests without a real backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use cppbuild::test_support::TestProject;
//!
//! #[test]
//! fn test_example() {
//!     let project = TestProject::new()
//!         .manifest("CppBuild.toml", "name = \"app\"\nfiles = [\"main.c\"]\n")
//!         .file("main.c", "int main(void) { return 0; }");
//!
//!     // load project.path("CppBuild.toml") ...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::errors::EngineResult;
use crate::core::target::{Target, TargetKind};
use crate::generator::{BuildNode, GeneratedFile, Generator};

pub use fixtures::*;

/// A temporary project directory populated with manifests and sources.
#[derive(Debug)]
pub struct TestProject {
    tmp: TempDir,
    root: PathBuf,
}

impl TestProject {
    /// Create an empty project in a fresh temp directory.
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        // Canonical, so paths compare equal to what the loader records.
        let root = tmp.path().canonicalize().unwrap();
        TestProject { tmp, root }
    }

    /// Write a file relative to the project root.
    pub fn file(self, rel: impl AsRef<Path>, contents: &str) -> Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    /// Write a manifest relative to the project root.
    pub fn manifest(self, rel: impl AsRef<Path>, contents: &str) -> Self {
        self.file(rel, contents)
    }

    /// Project root (canonical).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a file inside the project.
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }

    /// Read a file inside the project.
    pub fn read(&self, rel: impl AsRef<Path>) -> String {
        fs::read_to_string(self.root.join(rel)).unwrap()
    }

    /// Keep the underlying temp dir alive for the lifetime of the fixture.
    pub fn temp_dir(&self) -> &TempDir {
        &self.tmp
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Generator that records what it was asked to generate.
///
/// Artifacts are predicted as `<root>/<name>/<name>.lib` for static
/// libraries and `<root>/<name>/<name>` otherwise.
#[derive(Debug)]
pub struct RecordingGenerator {
    pub output_root: PathBuf,
    pub working_directory: PathBuf,
    /// Names of generated nodes plus the working directory seen at the time
    pub generated: RefCell<Vec<(String, PathBuf)>>,
}

impl RecordingGenerator {
    /// Names of generated nodes, in generation order.
    pub fn generated_names(&self) -> Vec<String> {
        self.generated.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Create a generator predicting artifacts under `output_root`.
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        RecordingGenerator {
            output_root: output_root.into(),
            working_directory: PathBuf::new(),
            generated: RefCell::new(Vec::new()),
        }
    }
}

impl Generator for RecordingGenerator {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn build_file_name(&self) -> &'static str {
        "BUILD"
    }

    fn generate(&self, node: &BuildNode<'_>) -> EngineResult<GeneratedFile> {
        self.generated
            .borrow_mut()
            .push((node.name().to_string(), self.working_directory.clone()));
        Ok(GeneratedFile::new(format!("generated {}\n", node.name())))
    }

    fn predict_output_path(&self, target: &Target) -> PathBuf {
        let dir = self.output_root.join(&target.name);
        match target.kind {
            TargetKind::StaticLibrary => dir.join(format!("{}.lib", target.name)),
            _ => dir.join(&target.name),
        }
    }

    fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    fn set_working_directory(&mut self, dir: PathBuf) {
        self.working_directory = dir;
    }
}

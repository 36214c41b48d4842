//! Premake5 backend.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::core::errors::EngineResult;
use crate::core::language::Language;
use crate::core::target::{Target, TargetKind};
use crate::generator::quote::lua;
use crate::generator::{
    artifact_path, BuildNode, GeneratedFile, Generator, Group, MergedProperties,
};
use crate::util::fs::absolutize;

/// Premake5 generator writing `premake5.lua` scripts.
#[derive(Debug, Clone)]
pub struct PremakeGenerator {
    output_root: PathBuf,
    working_directory: PathBuf,
}

impl PremakeGenerator {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        let output_root = output_root.into();
        PremakeGenerator {
            working_directory: output_root.clone(),
            output_root,
        }
    }

    fn generate_leaf(&self, target: &Target) -> String {
        let mut out = header();
        workspace(&mut out, &target.name);

        let merged = MergedProperties::of(target, &self.working_directory);
        let mut files = Vec::new();
        let mut uses_cxx = false;
        for file in &target.files {
            match Language::from_path(file) {
                Some(language) => {
                    uses_cxx |= language == Language::Cxx;
                    files.push(
                        absolutize(&self.working_directory, file)
                            .to_string_lossy()
                            .into_owned(),
                    );
                }
                None => tracing::warn!(
                    "skipping `{}` in target `{}`: no compiler for this extension",
                    file,
                    target.name
                ),
            }
        }

        let kind = match target.kind {
            TargetKind::Application => "ConsoleApp",
            TargetKind::Interface => "Utility",
            TargetKind::StaticLibrary => "StaticLib",
            TargetKind::DynamicLibrary => "SharedLib",
        };

        writeln!(out, "project {}", lua(&target.name)).unwrap();
        writeln!(out, "   kind {}", lua(kind)).unwrap();
        writeln!(out, "   language {}", lua(if uses_cxx { "C++" } else { "C" })).unwrap();

        if target.kind.has_artifact() {
            let artifact = self.predict_output_path(target);
            let dir = artifact.parent().unwrap_or(&self.output_root);
            let extension = artifact
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            writeln!(out, "   targetdir {}", lua(&dir.to_string_lossy())).unwrap();
            writeln!(out, "   targetname {}", lua(&target.name)).unwrap();
            writeln!(out, "   targetprefix \"\"").unwrap();
            writeln!(out, "   targetextension {}", lua(&extension)).unwrap();

            list(&mut out, "files", &files);
            list(&mut out, "includedirs", &merged.include_directories);
            list(&mut out, "defines", &merged.definitions);
            list(&mut out, "buildoptions", &merged.compiler_flags);
            list(&mut out, "libdirs", &merged.linker_directories);
            list(&mut out, "linkoptions", &merged.linker_flags);
            list(&mut out, "links", &target.resolved_link);
        }

        out
    }

    fn generate_group(&self, group: &Group<'_>) -> String {
        let mut out = header();
        workspace(&mut out, &group.name);
        for member in &group.members {
            writeln!(out, "include {}", lua(member.name)).unwrap();
        }
        out
    }
}

fn header() -> String {
    "-- Generated by cppbuild. Do not edit.\n\n".to_string()
}

fn workspace(out: &mut String, name: &str) {
    writeln!(out, "workspace {}", lua(name)).unwrap();
    writeln!(out, "   configurations {{ \"Debug\", \"Release\" }}").unwrap();
    writeln!(out, "   location \".\"\n").unwrap();
}

fn list(out: &mut String, key: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let values: Vec<String> = values.iter().map(|v| lua(v)).collect();
    writeln!(out, "   {} {{ {} }}", key, values.join(", ")).unwrap();
}

impl Generator for PremakeGenerator {
    fn name(&self) -> &'static str {
        "premake5"
    }

    fn build_file_name(&self) -> &'static str {
        "premake5.lua"
    }

    fn generate(&self, node: &BuildNode<'_>) -> EngineResult<GeneratedFile> {
        let content = match node {
            BuildNode::Leaf(target) => self.generate_leaf(target),
            BuildNode::Group(group) => self.generate_group(group),
        };
        Ok(GeneratedFile::new(content))
    }

    fn predict_output_path(&self, target: &Target) -> PathBuf {
        artifact_path(&self.output_root, target)
    }

    fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    fn set_working_directory(&mut self, dir: PathBuf) {
        self.working_directory = dir;
    }
}

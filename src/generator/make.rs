//! GNU Make backend.
//!
//! Each leaf target gets a `Makefile` in its own directory with one object
//! rule per source file and an `all` rule producing the artifact. A group
//! gets a `Makefile` that runs `$(MAKE) -C <member>` for every member, in
//! dependency order.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::core::errors::EngineResult;
use crate::core::language::Language;
use crate::core::target::{Target, TargetKind};
use crate::generator::quote::{make_prerequisite, make_recipe, make_value};
use crate::generator::{
    artifact_path, BuildNode, GeneratedFile, Generator, Group, MergedProperties,
};
use crate::util::fs::absolutize;

const COMPILE_ARGUMENTS: &str =
    "$(PROJECT_INCLUDE_DIRECTORIES) $(PROJECT_CXX_FLAGS) $(PROJECT_DEFINITIONS)";
const LINK_ARGUMENTS: &str =
    "$(PROJECT_LINKER_DIRECTORIES) $(PROJECT_LINKER_FLAGS) $(PROJECT_LINKED_LIBRARIES)";

/// Compiler and archiver commands written into generated makefiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub cc: String,
    pub cxx: String,
    pub ar: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain {
            cc: "cc".into(),
            cxx: "c++".into(),
            ar: "ar".into(),
        }
    }
}

/// GNU Make generator.
#[derive(Debug, Clone)]
pub struct MakeGenerator {
    output_root: PathBuf,
    toolchain: Toolchain,
    working_directory: PathBuf,
}

impl MakeGenerator {
    /// Create a generator whose artifacts land under `output_root`.
    pub fn new(output_root: impl Into<PathBuf>, toolchain: Toolchain) -> Self {
        let output_root = output_root.into();
        MakeGenerator {
            working_directory: output_root.clone(),
            output_root,
            toolchain,
        }
    }

    fn generate_leaf(&self, target: &Target) -> String {
        let mut out = header(&target.name);

        if target.kind == TargetKind::Interface {
            writeln!(out, ".PHONY: all\n").unwrap();
            writeln!(out, "all:").unwrap();
            let message = format!("Interface target {} has nothing to build", target.name);
            writeln!(out, "\t@echo {}", make_recipe(&message)).unwrap();
            return out;
        }

        let merged = MergedProperties::of(target, &self.working_directory);
        let objects = self.objects(target);
        let uses_cxx = objects.iter().any(|o| o.language == Language::Cxx);
        let artifact = self.predict_output_path(target);
        let artifact = make_recipe(&artifact.to_string_lossy());

        writeln!(out, "CC := {}", self.toolchain.cc).unwrap();
        writeln!(out, "CXX := {}", self.toolchain.cxx).unwrap();
        writeln!(out, "AR := {}", self.toolchain.ar).unwrap();
        writeln!(out).unwrap();

        variable(&mut out, "PROJECT_INCLUDE_DIRECTORIES", &merged.include_directories, "-I");
        variable(&mut out, "PROJECT_CXX_FLAGS", &merged.compiler_flags, "");
        variable(&mut out, "PROJECT_DEFINITIONS", &merged.definitions, "-D");
        variable(&mut out, "PROJECT_LINKER_DIRECTORIES", &merged.linker_directories, "-L");
        variable(&mut out, "PROJECT_LINKER_FLAGS", &merged.linker_flags, "");
        let libraries: Vec<String> = target
            .resolved_link
            .iter()
            .map(|l| link_argument(l))
            .collect();
        writeln!(
            out,
            "PROJECT_LINKED_LIBRARIES := {}",
            libraries
                .iter()
                .map(|l| make_value(l))
                .collect::<Vec<_>>()
                .join(" ")
        )
        .unwrap();
        writeln!(out).unwrap();

        let object_list = objects
            .iter()
            .map(|o| o.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(out, ".PHONY: all clean\n").unwrap();
        writeln!(out, "all: {}", object_list).unwrap();

        let linker = if uses_cxx { "$(CXX)" } else { "$(CC)" };
        match target.kind {
            TargetKind::StaticLibrary => {
                writeln!(out, "\t$(AR) rcs {} {}", artifact, object_list).unwrap();
            }
            TargetKind::DynamicLibrary => {
                writeln!(
                    out,
                    "\t{} -shared -o {} {} {}",
                    linker, artifact, object_list, LINK_ARGUMENTS
                )
                .unwrap();
            }
            _ => {
                writeln!(
                    out,
                    "\t{} -o {} {} {}",
                    linker, artifact, object_list, LINK_ARGUMENTS
                )
                .unwrap();
            }
        }
        writeln!(out).unwrap();

        let pic = if target.kind == TargetKind::DynamicLibrary {
            " -fPIC"
        } else {
            ""
        };
        for object in &objects {
            let compiler = match object.language {
                Language::C => "$(CC)",
                Language::Cxx => "$(CXX)",
            };
            let source = object.source.to_string_lossy();
            writeln!(out, "{}: {}", object.name, make_prerequisite(&source)).unwrap();
            writeln!(
                out,
                "\t{}{} {} -c {} -o {}\n",
                compiler,
                pic,
                COMPILE_ARGUMENTS,
                make_recipe(&source),
                object.name
            )
            .unwrap();
        }

        writeln!(out, "clean:").unwrap();
        writeln!(out, "\trm -f {} {}", object_list, artifact).unwrap();
        out
    }

    fn generate_group(&self, group: &Group<'_>) -> String {
        let mut out = header(&group.name);
        let rule = |name: &str| format!("subtarget_{}", make_prerequisite(name));
        let rules: Vec<String> = group.members.iter().map(|m| rule(m.name)).collect();

        writeln!(out, ".PHONY: all clean {}\n", rules.join(" ")).unwrap();
        writeln!(out, "all: {}\n", rules.join(" ")).unwrap();

        for member in &group.members {
            let deps: Vec<String> = member.depends_on.iter().map(|d| rule(d)).collect();
            writeln!(out, "{}: {}", rule(member.name), deps.join(" ")).unwrap();
            writeln!(out, "\t$(MAKE) -C {}\n", make_recipe(member.name)).unwrap();
        }

        writeln!(out, "clean:").unwrap();
        for member in &group.members {
            writeln!(out, "\t$(MAKE) -C {} clean", make_recipe(member.name)).unwrap();
        }
        out
    }

    /// One object per recognized source file, in declaration order.
    fn objects(&self, target: &Target) -> Vec<ObjectFile> {
        let mut objects = Vec::new();
        for (index, file) in target.files.iter().enumerate() {
            let Some(language) = Language::from_path(file) else {
                tracing::warn!(
                    "skipping `{}` in target `{}`: no compiler for this extension",
                    file,
                    target.name
                );
                continue;
            };
            let stem = Path::new(file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let stem: String = stem
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();

            objects.push(ObjectFile {
                name: format!("{}_{}.o", index, stem),
                source: absolutize(&self.working_directory, file),
                language,
            });
        }
        objects
    }
}

#[derive(Debug)]
struct ObjectFile {
    name: String,
    source: PathBuf,
    language: Language,
}

fn header(name: &str) -> String {
    format!("# Generated by cppbuild for `{}`. Do not edit.\n\n", name)
}

fn variable(out: &mut String, name: &str, values: &[String], prefix: &str) {
    let values: Vec<String> = values
        .iter()
        .map(|v| make_value(&format!("{}{}", prefix, v)))
        .collect();
    writeln!(out, "{} := {}", name, values.join(" ")).unwrap();
}

/// Linker argument for a resolved link entry.
///
/// Artifact paths are passed as files, flags verbatim, bare names as `-l`.
fn link_argument(entry: &str) -> String {
    if Path::new(entry).is_absolute() || entry.starts_with('-') {
        entry.to_string()
    } else {
        format!("-l{}", entry)
    }
}

impl Generator for MakeGenerator {
    fn name(&self) -> &'static str {
        "make"
    }

    fn build_file_name(&self) -> &'static str {
        "Makefile"
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

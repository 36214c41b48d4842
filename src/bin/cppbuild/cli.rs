//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use cppbuild::GeneratorKind;

/// CppBuild - generate build files from C/C++ target manifests
#[derive(Parser)]
#[command(name = "cppbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate build files for a manifest and everything it links
    Build(BuildArgs),

    /// Write target metadata for a manifest as JSON
    Discover(DiscoverArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Manifest file or directory (defaults to the nearest CppBuild.toml)
    pub manifest: Option<PathBuf>,

    /// Output directory for generated build files
    #[arg(short, long, env = "CPPBUILD_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Build file generator
    #[arg(short, long, value_enum)]
    pub generator: Option<GeneratorKind>,
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Manifest file or directory (defaults to the nearest CppBuild.toml)
    pub manifest: Option<PathBuf>,

    /// Metadata file to write
    #[arg(short, long, default_value = "cppbuild-targets.json")]
    pub output: PathBuf,

    /// Output directory artifact paths are predicted under
    #[arg(long, env = "CPPBUILD_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Generator whose artifact layout is predicted
    #[arg(short, long, value_enum)]
    pub generator: Option<GeneratorKind>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

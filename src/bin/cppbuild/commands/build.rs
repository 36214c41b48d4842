//! `cppbuild build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::{manifest_path, project_root};
use cppbuild::ops::{generate, GenerateOptions};
use cppbuild::GlobalContext;

/// Default output directory, relative to the manifest's directory.
pub const DEFAULT_OUT_DIR: &str = "build";

pub fn execute(args: BuildArgs, ctx: &GlobalContext) -> Result<()> {
    let manifest = manifest_path(args.manifest.as_deref(), ctx)?;
    let root = project_root(&manifest);
    let config = ctx.load_config(root);

    // CLI > config > default
    let out_dir = match args.out_dir {
        Some(dir) => ctx.resolve_path(&dir),
        None => config
            .build
            .out_dir
            .clone()
            .unwrap_or_else(|| root.join(DEFAULT_OUT_DIR)),
    };
    let generator = args.generator.or(config.build.generator).unwrap_or_default();

    let opts = GenerateOptions {
        manifest: manifest.clone(),
        out_dir: out_dir.clone(),
        generator,
        toolchain: config.toolchain(),
        search_paths: config.resolve.search_paths.clone(),
    };

    let report = generate(&opts)?;

    eprintln!(
        "    Generated {} {} file(s) in {}",
        report.files.len(),
        generator,
        out_dir.display()
    );

    Ok(())
}

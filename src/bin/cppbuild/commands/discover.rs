//! `cppbuild discover` command

use anyhow::Result;

use crate::cli::DiscoverArgs;
use crate::commands::build::DEFAULT_OUT_DIR;
use crate::commands::{manifest_path, project_root};
use cppbuild::ops::{discover, DiscoverOptions};
use cppbuild::GlobalContext;

pub fn execute(args: DiscoverArgs, ctx: &GlobalContext) -> Result<()> {
    let manifest = manifest_path(args.manifest.as_deref(), ctx)?;
    let root = project_root(&manifest);
    let config = ctx.load_config(root);

    let out_dir = match args.out_dir {
        Some(dir) => ctx.resolve_path(&dir),
        None => config
            .build
            .out_dir
            .clone()
            .unwrap_or_else(|| root.join(DEFAULT_OUT_DIR)),
    };
    let output = ctx.resolve_path(&args.output);

    let opts = DiscoverOptions {
        manifest: manifest.clone(),
        output: output.clone(),
        out_dir,
        generator: args.generator.or(config.build.generator).unwrap_or_default(),
        search_paths: config.resolve.search_paths.clone(),
    };

    let report = discover(&opts)?;

    eprintln!(
        "    Discovered {} target(s), metadata written to {}",
        report.targets.len(),
        output.display()
    );

    Ok(())
}

//! CppBuild CLI - build file generation for C/C++ targets

use anyhow::Result;
use clap::Parser;
use cppbuild::util::diagnostic;
use cppbuild::{EngineError, GlobalContext};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cppbuild=debug")
    } else {
        EnvFilter::new("cppbuild=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = match GlobalContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    };
    if cli.no_color {
        ctx.set_color(false);
    }

    if let Err(e) = run(cli.command, &ctx) {
        match e.downcast_ref::<EngineError>() {
            Some(engine) => {
                let diag = engine.to_diagnostic().relative_to(ctx.cwd());
                diagnostic::emit(&diag, ctx.color());
            }
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(command: Commands, ctx: &GlobalContext) -> Result<()> {
    match command {
        Commands::Build(args) => commands::build::execute(args, ctx),
        Commands::Discover(args) => commands::discover::execute(args, ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

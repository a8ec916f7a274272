//! Typeatlas CLI - inspect fonts, build SDF atlases, shape text

mod cli;
mod commands;

use clap::Parser;

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Info(args) => commands::info::run(args, cli.debug),
        Commands::Atlas(args) => commands::atlas::run(args, cli.debug),
        Commands::Shape(args) => commands::shape::run(args, cli.debug),
    }
}

// blockclean/src/main.rs
//! blockclean entry point.
//!
//! Parses arguments, configures logging and dispatches to the command runners.

use anyhow::Result;
use blockclean::cli::{Cli, Commands};
use blockclean::commands::{clean::run_clean, compose::run_compose, sanitize::run_sanitize};
use blockclean::logger;
use clap::Parser;
use log::LevelFilter;

fn main() -> Result<()> {
    let args = Cli::parse();

    let level = if args.quiet {
        Some(LevelFilter::Off)
    } else if args.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);

    match &args.command {
        Commands::Sanitize(cmd) => run_sanitize(cmd),
        Commands::Clean(cmd) => run_clean(cmd),
        Commands::Compose(cmd) => run_compose(cmd),
    }
}

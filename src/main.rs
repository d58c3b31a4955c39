//! faqgen: LM-assisted FAQ, product and comparison page generator.
//!
//! Two raw product records go in; three structured pages, an execution log and
//! a diagnostics bundle come out.
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod answers;
mod cli;
mod commands;
mod compare;
mod config;
mod context;
mod error;
mod lm;
mod output;
mod pages;
mod product;
mod questions;
mod schema;
#[cfg(test)]
mod test_support;
mod workflow;

use cli::{Command, RootArgs};

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Run(args) => commands::run_run(args),
        Command::Normalize(args) => commands::run_normalize(args),
        Command::Questions(args) => commands::run_questions(args),
        Command::Context(args) => commands::run_context(args),
        Command::Validate(args) => commands::run_validate(args),
    }
}

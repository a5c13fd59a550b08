//! Command-line entry point for the unit registry.
//!
//! # Responsibility
//! - Parse arguments and hand off to command handlers.
//! - Keep all query semantics inside `orgtree_core`.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::run(cli)
}

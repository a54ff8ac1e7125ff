//! Command-line tool for building HFS+ Unicode decomposition tables.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}

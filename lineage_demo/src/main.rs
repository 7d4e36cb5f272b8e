//! `config-lineage` entry point: resolve keys and report where each value came from.

use clap::Parser;
use lineage_demo::cli::Cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    lineage_demo::init_tracing(cli.verbose);
    lineage_demo::run(&cli).map_err(color_eyre::eyre::Report::from)
}

// src/bin/cli.rs
use clap::Parser;
use pedigree_scrape::{cli, log};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = cli::Cli::parse();
    let opts = args.options()?;
    log::init(&opts.store.log_path(), args.verbose);

    cli::run(args, opts)
}

//! nixsearch - Search a locally cached listing of Nix packages
//!
//! nixsearch provides:
//! - A per-user, per-install flat-text cache of the package listing
//! - Automatic refresh when the cache is missing or older than 24 hours
//! - Five escalating match strictness levels with highlighted output

use anyhow::Result;
use clap::Parser;

mod backends;
mod cache;
mod cli;
mod core;
mod search;

fn main() -> Result<()> {
    // Check for unsupported platforms
    #[cfg(windows)]
    {
        eprintln!("Error: Windows is not supported. Nix runs on Linux and macOS only.");
        std::process::exit(1);
    }

    let cli = cli::Cli::parse();
    core::logger::init_logger(cli.verbose);
    cli::run(cli)
}

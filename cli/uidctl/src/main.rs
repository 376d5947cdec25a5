//! uidctl - CLI for uidvault
//!
//! Generates identifiers, records each one in a local SQLite database, and
//! reports what has been issued.

use clap::Parser;

mod commands;
mod config;
mod error;
mod logging;
mod output;

use commands::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }
}

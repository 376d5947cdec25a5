//! CLI commands.

mod check;
mod generate;
mod show;
mod stats;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info_span};
use uidvault_registry::Registry;

use crate::config::Config;
use crate::logging::{self, LogSettings};
use crate::output::OutputFormat;

/// uidctl - issue unique identifiers and keep a record of each one.
#[derive(Debug, Parser)]
#[command(name = "uidctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the identifier database.
    #[arg(long, global = true, env = "UIDVAULT_DB")]
    db: Option<PathBuf>,

    /// Path to the JSON config file.
    #[arg(long, global = true, env = "UIDVAULT_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (table or json).
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Path to the log file.
    #[arg(long, global = true, env = "UIDVAULT_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Do not write a log file.
    #[arg(long, global = true)]
    no_log_file: bool,

    /// How long to wait for a locked database, in milliseconds.
    #[arg(long, global = true, env = "UIDVAULT_BUSY_TIMEOUT_MS")]
    busy_timeout_ms: Option<u64>,

    /// Increase stderr log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate and record a new identifier.
    Generate(generate::GenerateCommand),

    /// Show identifier counts.
    Stats(stats::StatsCommand),

    /// Check whether an identifier has been issued.
    Check(check::CheckCommand),

    /// Show a stored identifier record.
    Show(show::ShowCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        if let Commands::Version = self.command {
            println!("uidctl {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }

        let mut config = Config::load(self.config.as_deref())?;
        if let Some(db) = self.db {
            config.database_path = db;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }
        if let Some(busy_timeout_ms) = self.busy_timeout_ms {
            config.busy_timeout_ms = busy_timeout_ms;
        }

        let _log_guard = logging::init(&LogSettings {
            file: (!self.no_log_file).then_some(config.log_file.as_path()),
            max_bytes: config.log_max_bytes,
            backups: config.log_backups,
            verbosity: self.verbose,
        })?;
        debug!(db = %config.database_path.display(), "Resolved configuration");

        let ctx = CommandContext {
            config,
            format: self.format,
            command: self.command.name(),
        };

        match self.command {
            Commands::Generate(cmd) => cmd.run(ctx),
            Commands::Stats(cmd) => cmd.run(ctx),
            Commands::Check(cmd) => cmd.run(ctx),
            Commands::Show(cmd) => cmd.run(ctx),
            Commands::Version => Ok(()),
        }
    }
}

impl Commands {
    /// Subcommand name, as recorded in logs.
    fn name(&self) -> &'static str {
        match self {
            Commands::Generate(_) => "generate",
            Commands::Stats(_) => "stats",
            Commands::Check(_) => "check",
            Commands::Show(_) => "show",
            Commands::Version => "version",
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub command: &'static str,
}

impl CommandContext {
    /// Open the registry over the configured database. Registry events are
    /// logged under a `uidctl` span carrying the subcommand.
    pub fn registry(&self) -> Result<Registry> {
        let span = info_span!(
            "uidctl",
            command = self.command,
            db = %self.config.database_path.display(),
        );
        Ok(Registry::open(self.config.store_config())?.with_span(span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "uidctl", "stats", "--db", "ids.db", "--format", "json", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("ids.db")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["uidctl", "show", "abc"]).unwrap();
        assert_eq!(cli.command.name(), "show");
        let cli = Cli::try_parse_from(["uidctl", "generate", "--type", "v4"]).unwrap();
        assert_eq!(cli.command.name(), "generate");
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["uidctl", "--format", "yaml", "stats"]).is_err());
    }
}

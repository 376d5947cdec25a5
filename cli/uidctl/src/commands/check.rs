//! Check command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::output::{print_info, print_json, OutputFormat};

use super::CommandContext;

/// Check command - report whether an identifier is on record.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Identifier to look for.
    id: String,
}

#[derive(Debug, Serialize)]
struct CheckResult<'a> {
    id: &'a str,
    exists: bool,
}

impl CheckCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let exists = ctx.registry()?.check_duplicate(&self.id)?;

        match ctx.format {
            OutputFormat::Table if exists => print_info(&format!("{} exists", self.id)),
            OutputFormat::Table => print_info(&format!("{} does not exist", self.id)),
            OutputFormat::Json => print_json(&CheckResult {
                id: &self.id,
                exists,
            }),
        }

        Ok(())
    }
}

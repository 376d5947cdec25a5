//! Generate command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use uidvault_registry::{RegistryError, Scheme};

use crate::output::{print_json, print_success, OutputFormat};

use super::CommandContext;

/// Generate command - issue a new identifier and record it.
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Identifier scheme: v1, v4 or timestamp.
    #[arg(long = "type", value_name = "TYPE")]
    scheme: String,

    /// Category to file the identifier under (max 50 characters).
    #[arg(long)]
    category: Option<String>,

    /// Prefix for timestamp identifiers (max 5 alphanumeric characters).
    #[arg(long)]
    prefix: Option<String>,
}

#[derive(Debug, Serialize)]
struct Generated<'a> {
    id: &'a str,
    scheme: Scheme,
    category: Option<&'a str>,
    prefix: Option<String>,
}

impl GenerateCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let scheme: Scheme = self.scheme.parse().map_err(RegistryError::from)?;

        let registry = ctx.registry()?;
        let id = registry.generate(scheme, self.category.as_deref(), self.prefix.as_deref())?;

        match ctx.format {
            OutputFormat::Table => print_success(&format!("Generated UUID: {id}")),
            OutputFormat::Json => print_json(&Generated {
                id: &id,
                scheme,
                category: self.category.as_deref(),
                prefix: self.prefix.map(|p| p.to_uppercase()),
            }),
        }

        Ok(())
    }
}

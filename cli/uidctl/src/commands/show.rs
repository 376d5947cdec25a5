//! Show command.

use anyhow::Result;
use clap::Args;
use tabled::{Table, Tabled};
use uidvault_registry::{IdentifierRecord, Scheme, TimestampId};

use crate::error::CliError;
use crate::output::{print_json, OutputFormat};

use super::CommandContext;

/// Show command - print a stored identifier record.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Identifier to show.
    id: String,
}

impl ShowCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let record = ctx
            .registry()?
            .lookup(&self.id)?
            .ok_or_else(|| CliError::NotFound(self.id.clone()))?;

        match ctx.format {
            OutputFormat::Json => print_json(&record),
            OutputFormat::Table => println!("{}", record_table(&record)),
        }

        Ok(())
    }
}

#[derive(Debug, Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Key/value table for one record.
fn record_table(record: &IdentifierRecord) -> String {
    let mut rows = vec![
        FieldRow::new("ID", record.id.as_str()),
        FieldRow::new("Type", record.scheme.as_str()),
        FieldRow::new("Created", record.created_at.to_rfc3339()),
        FieldRow::new(
            "Category",
            record.category.as_ref().map_or("-", |c| c.as_str()),
        ),
        FieldRow::new(
            "Prefix",
            record.metadata.as_ref().map_or("-", |m| m.prefix.as_str()),
        ),
    ];

    // Timestamp identifiers embed their own issue time.
    if record.scheme == Scheme::Timestamp {
        if let Some(issued) = TimestampId::parse(&record.id).and_then(|ts| ts.time()) {
            rows.push(FieldRow::new("Encoded time", issued.to_rfc3339()));
        }
    }

    Table::new(rows).to_string()
}

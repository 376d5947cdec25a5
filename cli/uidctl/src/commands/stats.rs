//! Stats command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_rows, OutputFormat};

use super::CommandContext;

/// Stats command - show counts by scheme and by category.
#[derive(Debug, Args)]
pub struct StatsCommand {}

#[derive(Debug, Serialize, Tabled)]
struct CountRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Count")]
    count: u64,
}

impl StatsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let stats = ctx.registry()?.stats()?;

        match ctx.format {
            OutputFormat::Json => print_json(&stats),
            OutputFormat::Table => {
                println!("UUID Statistics:");
                println!("Total: {}", stats.total);

                let by_type: Vec<CountRow> = stats
                    .by_type
                    .iter()
                    .map(|(scheme, &count)| CountRow {
                        name: scheme.to_string(),
                        count,
                    })
                    .collect();
                println!("\nBy type:");
                print_rows(&by_type, ctx.format);

                let by_category: Vec<CountRow> = stats
                    .by_category
                    .iter()
                    .map(|(category, &count)| CountRow {
                        name: category.clone(),
                        count,
                    })
                    .collect();
                println!("\nBy category:");
                print_rows(&by_category, ctx.format);
            }
        }

        Ok(())
    }
}

//! Error handling and display for the CLI.

use colored::Colorize;
use thiserror::Error;
use uidvault_registry::{ErrorKind, RegistryError};

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Identifier not found: {0}")]
    NotFound(String),
}

/// Heading printed before the error message.
fn heading(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<RegistryError>().map(RegistryError::kind) {
        Some(ErrorKind::InputValidation) => "Input validation error:",
        Some(ErrorKind::DuplicateIdentifier) => "Duplicate identifier:",
        Some(ErrorKind::StorageInit) => "Storage initialization failed:",
        Some(ErrorKind::Storage) => "Storage error:",
        Some(ErrorKind::IdentifierGeneration) => "Identifier generation failed:",
        None => "Error:",
    }
}

/// Hint printed after the error message, if any.
fn hint(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(registry_err) = err.downcast_ref::<RegistryError>() {
        return match registry_err.kind() {
            ErrorKind::DuplicateIdentifier => Some(
                "Hint: Run the command again to draw a fresh identifier. \
                 Timestamp identifiers collide within one microsecond; use a distinct --prefix.",
            ),
            ErrorKind::StorageInit => {
                Some("Hint: Check that the --db path is writable and is not a directory.")
            }
            ErrorKind::Storage => Some(
                "Hint: Another process may hold the database lock; raise --busy-timeout-ms.",
            ),
            _ => None,
        };
    }

    match err.downcast_ref::<CliError>() {
        Some(CliError::NotFound(_)) => Some("Hint: Run `uidctl check <ID>` against the same --db."),
        None => None,
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", heading(err).red().bold(), err);

    if let Some(hint) = hint(err) {
        eprintln!("\n{}", hint.yellow());
    }
}

//! Error taxonomy for identifier issuance.

use thiserror::Error;
use uidvault_id::ValidationError;
use uidvault_store::StoreError;

/// Errors returned by the registry and the statistics aggregator.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Caller input violates a constraint. Never wrapped.
    #[error("{0}")]
    InputValidation(#[from] ValidationError),

    /// The identifier is already stored.
    #[error("identifier {id} already exists")]
    DuplicateIdentifier { id: String },

    /// The store could not be opened or its schema could not be created.
    #[error("storage initialization failed: {message}")]
    StorageInit { message: String },

    /// The store failed during a read.
    #[error("storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },

    /// Generation or persistence failed for a reason other than bad input or
    /// a collision.
    #[error("failed to {operation}: {message}")]
    IdentifierGeneration {
        operation: &'static str,
        message: String,
    },
}

/// Discriminant of [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InputValidation,
    DuplicateIdentifier,
    StorageInit,
    Storage,
    IdentifierGeneration,
}

impl RegistryError {
    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputValidation(_) => ErrorKind::InputValidation,
            Self::DuplicateIdentifier { .. } => ErrorKind::DuplicateIdentifier,
            Self::StorageInit { .. } => ErrorKind::StorageInit,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::IdentifierGeneration { .. } => ErrorKind::IdentifierGeneration,
        }
    }

    /// Maps a store failure that happened while opening the store.
    pub(crate) fn init(err: StoreError) -> Self {
        Self::StorageInit {
            message: err.to_string(),
        }
    }

    /// Maps a store failure that happened during a read.
    pub(crate) fn storage(operation: &'static str, err: StoreError) -> Self {
        Self::Storage {
            operation,
            message: err.to_string(),
        }
    }

    /// Maps a store failure that happened while persisting a new identifier.
    pub(crate) fn generation(operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { id } => Self::DuplicateIdentifier { id },
            other => Self::IdentifierGeneration {
                operation,
                message: other.to_string(),
            },
        }
    }
}

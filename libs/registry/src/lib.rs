//! # uidvault-registry
//!
//! Issues identifiers and records every one of them.
//!
//! Each generate operation runs the same sequence:
//!
//! 1. Validate the category (and prefix, for timestamp identifiers)
//! 2. Generate the identifier for the requested scheme
//! 3. Insert it into the store, failing if it already exists
//! 4. Return the identifier only after the insert committed
//!
//! Validation failures stop the sequence before the store is touched and are
//! reported as [`ErrorKind::InputValidation`]. A collision is reported as
//! [`ErrorKind::DuplicateIdentifier`]; the registry never retries on its own.

mod error;
mod registry;
mod stats;

pub use error::{ErrorKind, RegistryError};
pub use registry::Registry;
pub use stats::{collect_stats, Stats};

pub use uidvault_id::{Category, Clock, FixedClock, Prefix, Scheme, SystemClock, TimestampId};
pub use uidvault_store::{IdentifierRecord, IdentifierStore, RecordMetadata, StoreConfig};

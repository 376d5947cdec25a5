//! # uidvault-id
//!
//! Identifier schemes, input validation, and generators for uidvault.
//!
//! ## Schemes
//!
//! - `v1`: time-based UUID carrying a 60-bit timestamp, a clock sequence and
//!   a per-process random node ID
//! - `v4`: random UUID drawn from the operating system CSPRNG
//! - `timestamp`: microseconds since the Unix epoch as uppercase hex, with an
//!   optional prefix: `AB1-62F0A1B2C3D4E`
//!
//! ## Validation
//!
//! Caller input is checked before any identifier is produced:
//!
//! - a category is at most 50 characters
//! - a prefix is 1 to 5 alphanumeric characters and is upper-cased
//!
//! Validated values are carried as [`Category`] and [`Prefix`] so the rest of
//! the workspace cannot mix raw input with checked input.

mod clock;
mod error;
mod generate;
mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ValidationError;
pub use generate::{random_uuid, TimeBasedGenerator, TimestampId};
pub use types::{validate_category, validate_prefix, Category, Prefix, Scheme};

/// Re-export uuid for consumers that need raw UUID operations
pub use uuid::Uuid;

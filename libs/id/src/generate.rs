//! Identifier generators for each scheme.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::timestamp::context::Context;
use uuid::{Timestamp, Uuid};

use crate::Prefix;

/// Generates time-based (version 1) UUIDs.
///
/// The node ID is drawn once per generator from the thread RNG with the
/// multicast bit set, which marks it as random rather than a hardware
/// address. The clock sequence starts at a random value and is bumped
/// whenever two calls land on the same 100ns tick, so a single generator
/// never repeats itself.
pub struct TimeBasedGenerator {
    node_id: [u8; 6],
    context: Context,
}

impl TimeBasedGenerator {
    /// Creates a generator with a random node ID and clock sequence.
    pub fn new() -> Self {
        let mut node_id: [u8; 6] = rand::random();
        node_id[0] |= 0x01;
        Self::with_node_id(node_id)
    }

    /// Creates a generator with a fixed node ID.
    pub fn with_node_id(node_id: [u8; 6]) -> Self {
        Self {
            node_id,
            context: Context::new_random(),
        }
    }

    /// Returns the node ID embedded in every identifier.
    pub fn node_id(&self) -> [u8; 6] {
        self.node_id
    }

    /// Generates the next identifier.
    pub fn generate(&self) -> Uuid {
        let ts = Timestamp::now(&self.context);
        Uuid::new_v1(ts, &self.node_id)
    }
}

impl fmt::Debug for TimeBasedGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeBasedGenerator")
            .field("node_id", &self.node_id)
            .finish_non_exhaustive()
    }
}

impl Default for TimeBasedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a random (version 4) UUID from the OS random source.
pub fn random_uuid() -> Uuid {
    Uuid::new_v4()
}

/// A timestamp identifier: `[PREFIX-]HEX` where `HEX` is microseconds since
/// the Unix epoch in uppercase hexadecimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampId {
    prefix: Option<Prefix>,
    micros: u64,
}

impl TimestampId {
    /// Builds the identifier for `at`. Returns `None` for instants before the
    /// Unix epoch.
    pub fn from_time(prefix: Option<Prefix>, at: DateTime<Utc>) -> Option<Self> {
        let micros = u64::try_from(at.timestamp_micros()).ok()?;
        Some(Self { prefix, micros })
    }

    /// Parses an identifier previously produced by this type.
    pub fn parse(s: &str) -> Option<Self> {
        let (prefix, hex) = match s.split_once('-') {
            Some((prefix, hex)) => (Some(Prefix::new(prefix).ok()?), hex),
            None => (None, s),
        };
        let upper_hex = |c: char| c.is_ascii_digit() || ('A'..='F').contains(&c);
        if hex.is_empty() || !hex.chars().all(upper_hex) {
            return None;
        }
        let micros = u64::from_str_radix(hex, 16).ok()?;
        if let Some(prefix) = &prefix {
            if !s.starts_with(prefix.as_str()) {
                return None;
            }
        }
        Some(Self { prefix, micros })
    }

    /// Returns the prefix, if any.
    pub fn prefix(&self) -> Option<&Prefix> {
        self.prefix.as_ref()
    }

    /// Returns microseconds since the Unix epoch.
    pub fn micros(&self) -> u64 {
        self.micros
    }

    /// Returns the encoded instant.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(i64::try_from(self.micros).ok()?)
    }
}

impl fmt::Display for TimestampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}-{:X}", prefix, self.micros),
            None => write!(f, "{:X}", self.micros),
        }
    }
}

//! SQLite-based identifier store.
//!
//! Every issued identifier is a row in `identifiers`. The primary key is the
//! uniqueness backstop: a duplicate insert fails whether it is caught by the
//! pre-check inside the write transaction or by the constraint itself.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension, TransactionBehavior};
use thiserror::Error;
use tracing::debug;
use uidvault_id::{Category, Scheme};

use crate::record::{IdentifierRecord, RecordMetadata};

/// Errors from identifier store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema setup failed: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("identifier {id} already exists")]
    Duplicate { id: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("inconsistent record: {0}")]
    InconsistentRecord(String),
}

impl StoreError {
    /// Returns true if this error reports an identifier that is already stored.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Default database file name.
    pub const DEFAULT_PATH: &'static str = "uids.db";

    /// Default lock wait.
    pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a config for `path` with the default busy timeout.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Self::DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Overrides the busy timeout.
    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATH)
    }
}

/// Counts read inside a single transaction, so `total` always equals the sum
/// of `by_scheme`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountSnapshot {
    pub total: u64,
    pub by_scheme: BTreeMap<Scheme, u64>,
    pub by_category: BTreeMap<String, u64>,
}

/// SQLite identifier store.
///
/// Holds configuration only; each operation opens its own connection, so a
/// store can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct IdentifierStore {
    config: StoreConfig,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS identifiers (
        id TEXT PRIMARY KEY NOT NULL,
        scheme TEXT NOT NULL,
        created_at TEXT NOT NULL,
        category TEXT,
        metadata TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_identifiers_scheme ON identifiers(scheme);
    CREATE INDEX IF NOT EXISTS idx_identifiers_category ON identifiers(category);
"#;

const SELECT_RECORD: &str =
    "SELECT id, scheme, created_at, category, metadata FROM identifiers WHERE id = ?1";

impl IdentifierStore {
    /// Open a store at the configured path, creating the file and schema if
    /// needed.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let store = Self { config };
        store.initialize()?;
        Ok(store)
    }

    /// Returns the database path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Create the table and indexes if absent. Safe to call on every start.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.config.path).map_err(|source| StoreError::Open {
            path: self.config.path.clone(),
            source,
        })?;
        conn.busy_timeout(self.config.busy_timeout)
            .map_err(StoreError::Schema)?;

        // WAL lets readers proceed while a writer holds the lock
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(StoreError::Schema)?;
        conn.execute_batch(SCHEMA).map_err(StoreError::Schema)?;

        debug!(path = %self.config.path.display(), "Identifier store schema initialized");
        Ok(())
    }

    /// Open a connection for a single operation.
    fn connect(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.config.path, flags).map_err(|source| {
            StoreError::Open {
                path: self.config.path.clone(),
                source,
            }
        })?;
        conn.busy_timeout(self.config.busy_timeout)?;
        conn.execute_batch("PRAGMA synchronous=FULL;")?;
        Ok(conn)
    }

    /// Insert a record unless its identifier is already stored.
    ///
    /// The existence check and the insert run in one `IMMEDIATE` transaction,
    /// which takes the write lock up front; of two concurrent callers with
    /// the same identifier, exactly one commits.
    pub fn insert_if_absent(&self, record: &IdentifierRecord) -> Result<(), StoreError> {
        if !record.is_consistent() {
            return Err(StoreError::InconsistentRecord(format!(
                "scheme '{}' does not carry metadata",
                record.scheme
            )));
        }

        let metadata = record
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::InconsistentRecord(e.to_string()))?;

        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let present = tx
            .query_row(
                "SELECT 1 FROM identifiers WHERE id = ?1",
                params![record.id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if present {
            return Err(StoreError::Duplicate {
                id: record.id.clone(),
            });
        }

        let inserted = tx.execute(
            r#"
            INSERT INTO identifiers (id, scheme, created_at, category, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.scheme.as_str(),
                record
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
                record.category.as_ref().map(Category::as_str),
                metadata,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(StoreError::Duplicate {
                    id: record.id.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit()?;
        debug!(id = %record.id, scheme = %record.scheme, "Identifier stored");
        Ok(())
    }

    /// Check whether an identifier is stored.
    pub fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM identifiers WHERE id = ?1",
                params![id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Get a stored record.
    pub fn get(&self, id: &str) -> Result<Option<IdentifierRecord>, StoreError> {
        let conn = self.connect()?;
        let raw = conn
            .query_row(SELECT_RECORD, params![id], |row| {
                Ok(RawRecord {
                    id: row.get(0)?,
                    scheme: row.get(1)?,
                    created_at: row.get(2)?,
                    category: row.get(3)?,
                    metadata: row.get(4)?,
                })
            })
            .optional()?;

        raw.map(IdentifierRecord::try_from).transpose()
    }

    /// Count records grouped by scheme.
    pub fn counts_by_scheme(&self) -> Result<BTreeMap<Scheme, u64>, StoreError> {
        let conn = self.connect()?;
        query_counts_by_scheme(&conn)
    }

    /// Count records grouped by category. Records without a category are
    /// left out.
    pub fn counts_by_category(&self) -> Result<BTreeMap<String, u64>, StoreError> {
        let conn = self.connect()?;
        query_counts_by_category(&conn)
    }

    /// Count all records.
    pub fn total_count(&self) -> Result<u64, StoreError> {
        let conn = self.connect()?;
        query_total(&conn)
    }

    /// Read all counts from one consistent snapshot.
    pub fn count_snapshot(&self) -> Result<CountSnapshot, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

        let snapshot = CountSnapshot {
            total: query_total(&tx)?,
            by_scheme: query_counts_by_scheme(&tx)?,
            by_category: query_counts_by_category(&tx)?,
        };

        tx.finish()?;
        Ok(snapshot)
    }
}

fn query_total(conn: &Connection) -> Result<u64, StoreError> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM identifiers", [], |row| row.get(0))?;
    to_count(count)
}

fn query_counts_by_scheme(conn: &Connection) -> Result<BTreeMap<Scheme, u64>, StoreError> {
    let mut stmt = conn.prepare("SELECT scheme, COUNT(*) FROM identifiers GROUP BY scheme")?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts = BTreeMap::new();
    for (scheme, count) in rows {
        let scheme = scheme
            .parse::<Scheme>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        counts.insert(scheme, to_count(count)?);
    }
    Ok(counts)
}

fn query_counts_by_category(conn: &Connection) -> Result<BTreeMap<String, u64>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT category, COUNT(*) FROM identifiers WHERE category IS NOT NULL GROUP BY category",
    )?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(category, count)| to_count(count).map(|n| (category, n)))
        .collect()
}

fn to_count(count: i64) -> Result<u64, StoreError> {
    u64::try_from(count).map_err(|_| StoreError::Corrupt(format!("negative count {count}")))
}

/// Row as stored, before decoding.
struct RawRecord {
    id: String,
    scheme: String,
    created_at: String,
    category: Option<String>,
    metadata: Option<String>,
}

impl TryFrom<RawRecord> for IdentifierRecord {
    type Error = StoreError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let corrupt = |what: &str, err: &dyn std::fmt::Display| {
            StoreError::Corrupt(format!("{}: invalid {what}: {err}", raw.id))
        };

        let scheme = raw
            .scheme
            .parse::<Scheme>()
            .map_err(|e| corrupt("scheme", &e))?;
        let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
            .map_err(|e| corrupt("created_at", &e))?
            .with_timezone(&Utc);
        let category = raw
            .category
            .as_deref()
            .map(Category::new)
            .transpose()
            .map_err(|e| corrupt("category", &e))?;
        let metadata = raw
            .metadata
            .as_deref()
            .map(serde_json::from_str::<RecordMetadata>)
            .transpose()
            .map_err(|e| corrupt("metadata", &e))?;

        Ok(IdentifierRecord {
            id: raw.id,
            scheme,
            created_at,
            category,
            metadata,
        })
    }
}

//! Identifier registry: validate, generate, persist.

use tracing::{error, info, info_span, warn, Span};
use uidvault_id::{
    random_uuid, validate_category, validate_prefix, Category, Clock, Scheme, SystemClock,
    TimeBasedGenerator, TimestampId, ValidationError,
};
use uidvault_store::{IdentifierRecord, IdentifierStore, RecordMetadata, StoreConfig};

use crate::error::RegistryError;
use crate::stats::{collect_stats, Stats};

const OP_V1: &str = "generate v1 identifier";
const OP_V4: &str = "generate v4 identifier";
const OP_TIMESTAMP: &str = "generate timestamp identifier";
const OP_CHECK: &str = "check duplicate";
const OP_LOOKUP: &str = "look up identifier";

/// Issues identifiers and records them in the store.
///
/// The registry is `Sync`; share it behind an `Arc` or a reference across
/// threads. The only state it holds besides the store handle is the v1
/// generator's node ID and clock sequence.
#[derive(Debug)]
pub struct Registry<C = SystemClock> {
    store: IdentifierStore,
    clock: C,
    time_based: TimeBasedGenerator,
    span: Span,
}

impl Registry<SystemClock> {
    /// Open the store (creating its schema if needed) and build a registry
    /// on the system clock.
    pub fn open(config: StoreConfig) -> Result<Self, RegistryError> {
        let store = IdentifierStore::open(config).map_err(|e| {
            error!(error = %e, "Identifier store initialization failed");
            RegistryError::init(e)
        })?;
        Ok(Self::new(store))
    }

    /// Build a registry over an already opened store.
    pub fn new(store: IdentifierStore) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<C: Clock> Registry<C> {
    /// Build a registry reading time from `clock`.
    pub fn with_clock(store: IdentifierStore, clock: C) -> Self {
        let span = info_span!("registry", db = %store.path().display());
        Self {
            store,
            clock,
            time_based: TimeBasedGenerator::new(),
            span,
        }
    }

    /// Replace the span every operation is recorded under.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Generate an identifier for `scheme`.
    ///
    /// A prefix is only accepted for [`Scheme::Timestamp`].
    pub fn generate(
        &self,
        scheme: Scheme,
        category: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<String, RegistryError> {
        if prefix.is_some() && !scheme.accepts_prefix() {
            let _enter = self.span.enter();
            let err = ValidationError::PrefixNotSupported {
                scheme: scheme.to_string(),
            };
            warn!(%scheme, error = %err, "Input validation failed");
            return Err(err.into());
        }

        match scheme {
            Scheme::V1 => self.generate_time_based(category),
            Scheme::V4 => self.generate_random(category),
            Scheme::Timestamp => self.generate_timestamp_based(prefix, category),
        }
    }

    /// Generate and store a time-based (v1) UUID.
    pub fn generate_time_based(&self, category: Option<&str>) -> Result<String, RegistryError> {
        let _enter = self.span.enter();
        let category = self.validated_category(Scheme::V1, category)?;

        let id = self.time_based.generate().to_string();
        self.persist(OP_V1, IdentifierRecord::new(&id, Scheme::V1, self.clock.now(), category))?;
        Ok(id)
    }

    /// Generate and store a random (v4) UUID.
    pub fn generate_random(&self, category: Option<&str>) -> Result<String, RegistryError> {
        let _enter = self.span.enter();
        let category = self.validated_category(Scheme::V4, category)?;

        let id = random_uuid().to_string();
        self.persist(OP_V4, IdentifierRecord::new(&id, Scheme::V4, self.clock.now(), category))?;
        Ok(id)
    }

    /// Generate and store a timestamp identifier, `[PREFIX-]HEX`.
    ///
    /// Two calls in the same microsecond with the same prefix produce the
    /// same identifier; the second fails as a duplicate.
    pub fn generate_timestamp_based(
        &self,
        prefix: Option<&str>,
        category: Option<&str>,
    ) -> Result<String, RegistryError> {
        let _enter = self.span.enter();
        let category = self.validated_category(Scheme::Timestamp, category)?;
        let prefix = validate_prefix(prefix).map_err(|e| {
            warn!(scheme = %Scheme::Timestamp, error = %e, "Input validation failed");
            RegistryError::from(e)
        })?;

        let now = self.clock.now();
        let id = TimestampId::from_time(prefix.clone(), now)
            .ok_or_else(|| {
                error!(%now, "Clock is before the Unix epoch");
                RegistryError::IdentifierGeneration {
                    operation: OP_TIMESTAMP,
                    message: format!("clock reads {now}, before the Unix epoch"),
                }
            })?
            .to_string();

        let mut record = IdentifierRecord::new(&id, Scheme::Timestamp, now, category);
        if let Some(prefix) = prefix {
            record = record.with_metadata(RecordMetadata { prefix });
        }
        self.persist(OP_TIMESTAMP, record)?;
        Ok(id)
    }

    /// Check whether an identifier is already stored.
    pub fn check_duplicate(&self, id: &str) -> Result<bool, RegistryError> {
        let _enter = self.span.enter();
        self.store.exists(id).map_err(|e| {
            error!(%id, error = %e, "Duplicate check failed");
            RegistryError::storage(OP_CHECK, e)
        })
    }

    /// Fetch a stored record.
    pub fn lookup(&self, id: &str) -> Result<Option<IdentifierRecord>, RegistryError> {
        let _enter = self.span.enter();
        self.store.get(id).map_err(|e| {
            error!(%id, error = %e, "Lookup failed");
            RegistryError::storage(OP_LOOKUP, e)
        })
    }

    /// Counts by scheme and category.
    pub fn stats(&self) -> Result<Stats, RegistryError> {
        let _enter = self.span.enter();
        collect_stats(&self.store)
    }

    fn validated_category(
        &self,
        scheme: Scheme,
        category: Option<&str>,
    ) -> Result<Option<Category>, RegistryError> {
        validate_category(category).map_err(|e| {
            warn!(%scheme, error = %e, "Input validation failed");
            RegistryError::from(e)
        })
    }

    fn persist(
        &self,
        operation: &'static str,
        record: IdentifierRecord,
    ) -> Result<(), RegistryError> {
        match self.store.insert_if_absent(&record) {
            Ok(()) => {
                info!(
                    id = %record.id,
                    scheme = %record.scheme,
                    category = ?record.category.as_ref().map(Category::as_str),
                    "Generated identifier"
                );
                Ok(())
            }
            Err(e) if e.is_duplicate() => {
                warn!(id = %record.id, scheme = %record.scheme, "Identifier collision");
                Err(RegistryError::generation(operation, e))
            }
            Err(e) => {
                error!(id = %record.id, error = %e, "Failed to {}", operation);
                Err(RegistryError::generation(operation, e))
            }
        }
    }
}

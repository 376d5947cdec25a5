//! Statistics over issued identifiers.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error};
use uidvault_id::Scheme;
use uidvault_store::IdentifierStore;

use crate::error::RegistryError;

/// Identifier counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// All stored identifiers.
    pub total: u64,
    /// Count per scheme; schemes with no identifiers are absent.
    pub by_type: BTreeMap<Scheme, u64>,
    /// Count per category; identifiers without a category are not counted.
    pub by_category: BTreeMap<String, u64>,
}

impl Stats {
    /// Returns the count for one scheme, zero if none were issued.
    pub fn count_for(&self, scheme: Scheme) -> u64 {
        self.by_type.get(&scheme).copied().unwrap_or(0)
    }
}

/// Read counts from the store.
pub fn collect_stats(store: &IdentifierStore) -> Result<Stats, RegistryError> {
    let snapshot = store.count_snapshot().map_err(|e| {
        error!(error = %e, "Failed to collect statistics");
        RegistryError::storage("collect statistics", e)
    })?;

    debug!(total = snapshot.total, "Collected statistics");
    Ok(Stats {
        total: snapshot.total,
        by_type: snapshot.by_scheme,
        by_category: snapshot.by_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_json_shape() {
        let stats = Stats {
            total: 5,
            by_type: BTreeMap::from([(Scheme::V1, 2), (Scheme::V4, 3)]),
            by_category: BTreeMap::from([("batch".to_string(), 1)]),
        };

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "total": 5,
                "by_type": { "v1": 2, "v4": 3 },
                "by_category": { "batch": 1 }
            })
        );
    }

    #[test]
    fn test_count_for_missing_scheme() {
        let stats = Stats::default();
        assert_eq!(stats.count_for(Scheme::Timestamp), 0);
    }
}

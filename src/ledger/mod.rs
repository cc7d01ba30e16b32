//! Per-run bookkeeping: counters, seen-record provenance, and the stores
//! that persist seen records for later delta sweeps.

pub mod persistence;
pub mod store;

pub use persistence::FileSeenStore;
pub use store::{InMemorySeenStore, SeenStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Result;

/// Per-run reconciliation counters. Zeroed at run start, read once at run
/// end for the summary audit entry; never reset mid-run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub adds: u64,
    pub updates: u64,
    pub deletes: u64,
    pub errors: u64,
}

/// Provenance of one successfully processed row: which identity the feed
/// reaffirmed and in which run. Any record whose stamp differs from the
/// current run's stamp marks an identity the feed did not re-affirm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub external_key: String,
    pub internal_id: String,
    pub stamp: DateTime<Utc>,
}

/// Tracks one run: its stamp and counters, and writes seen records through
/// a `SeenStore`.
#[derive(Debug)]
pub struct RunLedger {
    stamp: DateTime<Utc>,
    counters: RunCounters,
}

impl RunLedger {
    pub fn new(stamp: DateTime<Utc>) -> Self {
        Self {
            stamp,
            counters: RunCounters::default(),
        }
    }

    pub fn stamp(&self) -> DateTime<Utc> {
        self.stamp
    }

    /// Record that this run reaffirmed an identity. Idempotent per
    /// (external key, stamp): the store keeps one live record per key.
    pub fn record_seen<S: SeenStore>(
        &self,
        store: &mut S,
        external_key: &str,
        internal_id: &str,
    ) -> Result<()> {
        store.save(SeenRecord {
            external_key: external_key.to_string(),
            internal_id: internal_id.to_string(),
            stamp: self.stamp,
        })
    }

    pub fn count_add(&mut self) {
        self.counters.adds += 1;
    }

    pub fn count_update(&mut self) {
        self.counters.updates += 1;
    }

    pub fn count_delete(&mut self) {
        self.counters.deletes += 1;
    }

    pub fn count_error(&mut self) {
        self.counters.errors += 1;
    }

    pub fn summary(&self) -> RunCounters {
        self.counters
    }
}

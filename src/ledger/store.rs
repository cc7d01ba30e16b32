use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::core::Result;
use crate::ledger::SeenRecord;

/// Persistence collaborator for seen records.
pub trait SeenStore {
    /// Upsert by external key; the newest stamp supersedes prior ones
    fn save(&mut self, record: SeenRecord) -> Result<()>;

    /// One page of records whose stamp differs from `stamp`, in a stable
    /// order. Pagination stays consistent across calls as long as the
    /// underlying set is not mutated in between.
    fn find_stale(
        &self,
        stamp: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SeenRecord>>;

    /// Number of live records (one per external key)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// BTreeMap-backed store; key ordering gives stable pages.
#[derive(Debug, Default)]
pub struct InMemorySeenStore {
    records: BTreeMap<String, SeenRecord>,
}

impl InMemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, external_key: &str) -> Option<&SeenRecord> {
        self.records.get(external_key)
    }
}

impl SeenStore for InMemorySeenStore {
    fn save(&mut self, record: SeenRecord) -> Result<()> {
        self.records.insert(record.external_key.clone(), record);
        Ok(())
    }

    fn find_stale(
        &self,
        stamp: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SeenRecord>> {
        Ok(self
            .records
            .values()
            .filter(|record| record.stamp != stamp)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(key: &str, stamp: DateTime<Utc>) -> SeenRecord {
        SeenRecord {
            external_key: key.to_string(),
            internal_id: format!("id-{}", key),
            stamp,
        }
    }

    #[test]
    fn find_stale_excludes_current_stamp() {
        let mut store = InMemorySeenStore::new();
        let old = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        store.save(record("al", old)).unwrap();
        store.save(record("bob", now)).unwrap();

        let stale = store.find_stale(now, 0, 10).unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].external_key, "al");
    }

    #[test]
    fn pagination_is_stable_and_ordered() {
        let mut store = InMemorySeenStore::new();
        let old = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        for key in ["c", "a", "b"] {
            store.save(record(key, old)).unwrap();
        }

        let first = store.find_stale(now, 0, 2).unwrap();
        let second = store.find_stale(now, 2, 2).unwrap();
        let keys: Vec<&str> = first
            .iter()
            .chain(second.iter())
            .map(|r| r.external_key.as_str())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(store.find_stale(now, 4, 2).unwrap().is_empty());
    }
}

use chrono::{DateTime, Utc};

use crate::audit::AuditSink;
use crate::config::SyncConfig;
use crate::core::Result;
use crate::directory::{DirectoryEntry, UserDirectory};
use crate::engine::AUDIT_SOURCE;
use crate::ledger::{RunLedger, SeenRecord, SeenStore};

/// Lazy, restartable sequence of stale seen-record pages.
///
/// Each `next` fetches the page at the current offset and advances by one
/// page size; iteration ends at the first empty page or store failure. No
/// cursor state lives outside this iterator.
pub(crate) struct StalePages<'a, S: SeenStore> {
    store: &'a S,
    stamp: DateTime<Utc>,
    page_size: usize,
    offset: usize,
    done: bool,
}

impl<'a, S: SeenStore> StalePages<'a, S> {
    pub fn new(store: &'a S, stamp: DateTime<Utc>, page_size: usize) -> Self {
        Self {
            store,
            stamp,
            page_size,
            offset: 0,
            done: false,
        }
    }
}

impl<'a, S: SeenStore> Iterator for StalePages<'a, S> {
    type Item = Result<Vec<SeenRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.store.find_stale(self.stamp, self.offset, self.page_size) {
            Ok(page) if page.is_empty() => {
                self.done = true;
                None
            }
            Ok(page) => {
                self.offset += self.page_size;
                Some(Ok(page))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Deactivate or remove every identity the current run did not reaffirm.
///
/// Runs once, strictly after the row loop. Per-entry failures are audited
/// and logged but only successful sweep actions touch a counter; the error
/// counter belongs to the main pass.
pub(crate) fn sweep<D, S, A>(
    config: &SyncConfig,
    store: &S,
    directory: &mut D,
    audit: &mut A,
    ledger: &mut RunLedger,
) where
    D: UserDirectory,
    S: SeenStore,
    A: AuditSink,
{
    for page in StalePages::new(store, ledger.stamp(), config.search_page_size) {
        let page = match page {
            Ok(page) => page,
            Err(err) => {
                // Without pages there is nothing left to sweep.
                audit.record(AUDIT_SOURCE, &err.to_string());
                log::error!("person sync: {}", err);
                break;
            }
        };
        for record in &page {
            match sweep_entry(config, directory, record) {
                Ok(()) => ledger.count_delete(),
                Err(err) => {
                    audit.record(AUDIT_SOURCE, &err.to_string());
                    log::error!("person sync: {}", err);
                }
            }
        }
    }
}

fn sweep_entry<D: UserDirectory>(
    config: &SyncConfig,
    directory: &mut D,
    record: &SeenRecord,
) -> Result<()> {
    let mut entry = directory.open_for_edit(&record.internal_id)?;
    if config.delete_users {
        directory.remove(entry)
    } else {
        entry.set_type(&config.suspended_type);
        directory.commit(entry)
    }
}

//! Run orchestration: the per-row upsert loop followed by the generational
//! delta sweep.

mod sweep;
mod upsert;

use chrono::{DateTime, Utc};

use crate::audit::AuditSink;
use crate::config::SyncConfig;
use crate::core::{Result, RowOutcome};
use crate::directory::UserDirectory;
use crate::feed::{FieldExtractor, OptionalFieldSpec};
use crate::ledger::{RunCounters, RunLedger, SeenStore};

/// Source tag stamped on every audit entry the engine writes
pub(crate) const AUDIT_SOURCE: &str = "person_sync";

/// Reconciliation engine, generic over its three collaborators.
///
/// Single-threaded and synchronous for the duration of one run; directory
/// calls are treated as blocking, one commit per row or sweep entry.
pub struct SyncEngine<D, S, A> {
    config: SyncConfig,
    extractor: FieldExtractor,
    directory: D,
    seen: S,
    audit: A,
}

impl<D, S, A> SyncEngine<D, S, A>
where
    D: UserDirectory,
    S: SeenStore,
    A: AuditSink,
{
    /// Validate the configuration and resolve the optional-column layout.
    pub fn new(config: SyncConfig, directory: D, seen: S, audit: A) -> Result<Self> {
        config.validate()?;
        let extractor =
            FieldExtractor::new(OptionalFieldSpec::resolve(&config.optional_field_names));
        Ok(Self {
            config,
            extractor,
            directory,
            seen,
            audit,
        })
    }

    /// Process a full feed stamped with the current time.
    pub fn run<I>(&mut self, rows: I) -> RunCounters
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        self.run_at(rows, Utc::now())
    }

    /// Process a full feed under an explicit run stamp.
    ///
    /// Rows are processed strictly in feed order; the delta sweep runs once
    /// after the last row, never interleaved. Row and sweep failures are
    /// counted and audited, never propagated. There is no cancellation check
    /// inside a run; a wrapping scheduler decides whether to start the next.
    pub fn run_at<I>(&mut self, rows: I, stamp: DateTime<Utc>) -> RunCounters
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut ledger = RunLedger::new(stamp);
        for fields in rows {
            self.process_row(&mut ledger, &fields);
        }
        self.finish_run(ledger)
    }

    /// Process one pre-tokenized row against an externally held ledger.
    ///
    /// `run_at` drives this for every feed row; streaming callers can manage
    /// their own loop and call `finish_run` once the feed is exhausted. The
    /// returned outcome is directly assertable, including the benign-conflict
    /// case that is neither counted nor audited.
    pub fn process_row(&mut self, ledger: &mut RunLedger, fields: &[String]) -> RowOutcome {
        upsert::process_row(
            &self.extractor,
            &mut self.directory,
            &mut self.seen,
            &mut self.audit,
            ledger,
            fields,
        )
    }

    /// Sweep identities the run did not reaffirm, write the summary audit
    /// entry, and return the run's counters.
    pub fn finish_run(&mut self, mut ledger: RunLedger) -> RunCounters {
        sweep::sweep(
            &self.config,
            &self.seen,
            &mut self.directory,
            &mut self.audit,
            &mut ledger,
        );
        let counters = ledger.summary();
        self.audit.record(
            AUDIT_SOURCE,
            &format!(
                "Finished processing input, added {} items, updated {} items and removed {}",
                counters.adds, counters.updates, counters.deletes
            ),
        );
        counters
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut D {
        &mut self.directory
    }

    pub fn seen_store(&self) -> &S {
        &self.seen
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Release the collaborators
    pub fn into_parts(self) -> (D, S, A) {
        (self.directory, self.seen, self.audit)
    }
}

//! rostersync — reconcile a person directory against a periodic flat-file feed.
//!
//! Each run ingests pre-tokenized rows describing the full population that
//! should exist, upserts every row against the directory, and finishes with a
//! generational delta sweep that suspends or removes identities the feed did
//! not reaffirm. Malformed rows and per-entry directory failures are counted
//! and audited without aborting the run.
//!
//! Transport (file reading, CSV tokenization) and the production directory
//! backend live outside this crate; the collaborator seams are the
//! [`UserDirectory`], [`SeenStore`] and [`AuditSink`] traits, with in-memory
//! and file-backed reference implementations included.
//!
//! # Examples
//!
//! ```
//! use rostersync::{InMemoryDirectory, InMemorySeenStore, MemoryAuditSink, SyncConfig, SyncEngine};
//!
//! # fn main() -> rostersync::Result<()> {
//! let config = SyncConfig::new().optional_field_names(["id", "dept"]);
//! let mut engine = SyncEngine::new(
//!     config,
//!     InMemoryDirectory::new(),
//!     InMemorySeenStore::new(),
//!     MemoryAuditSink::new(),
//! )?;
//!
//! let feed = vec![
//!     vec!["bob".to_string(), "Bobson".to_string(), "Bob".to_string(),
//!          "bob@x.com".to_string(), "pw1".to_string(), "staff".to_string()],
//! ];
//! let counters = engine.run(feed);
//! assert_eq!(counters.adds, 1);
//! assert_eq!(counters.errors, 0);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod directory;
pub mod engine;
pub mod feed;
pub mod ledger;

// Re-export main types for convenience
pub use audit::{AuditEntry, AuditSink, LogAuditSink, MemoryAuditSink};
pub use config::{ID_FIELD_NAME, SyncConfig};
pub use crate::core::{Result, RowOutcome, SyncError};
pub use directory::{DirectoryEntry, InMemoryDirectory, UserDirectory, UserEdit, UserRecord};
pub use engine::SyncEngine;
pub use feed::{FieldExtractor, MIN_FIELD_COUNT, OptionalFieldSpec, PersonRow};
pub use ledger::{
    FileSeenStore, InMemorySeenStore, RunCounters, RunLedger, SeenRecord, SeenStore,
};

use crate::core::error::SyncError;

/// Classified result of processing one feed row.
#[derive(Debug)]
pub enum RowOutcome {
    /// A new directory entry was created for a first-time external key.
    Created,
    /// An existing entry was re-applied from the feed.
    Updated,
    /// Another writer created the identity between lookup and create.
    /// Routine under concurrent runs; neither a success nor a failure.
    BenignConflict,
    /// The row was skipped; the error counter was incremented.
    Failed(SyncError),
}

impl RowOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RowOutcome::Failed(_))
    }
}

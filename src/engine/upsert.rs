use crate::audit::AuditSink;
use crate::config::ID_FIELD_NAME;
use crate::core::{Result, RowOutcome, SyncError};
use crate::directory::{DirectoryEntry, UserDirectory};
use crate::engine::AUDIT_SOURCE;
use crate::feed::{FieldExtractor, MIN_FIELD_COUNT, PersonRow};
use crate::ledger::{RunLedger, SeenStore};

pub(crate) struct UpsertResult {
    pub outcome: RowOutcome,
    /// Internal id to record as seen; `None` when the row failed
    pub seen_id: Option<String>,
}

/// Extract, resolve, upsert and book-keep one feed row.
pub(crate) fn process_row<D, S, A>(
    extractor: &FieldExtractor,
    directory: &mut D,
    seen: &mut S,
    audit: &mut A,
    ledger: &mut RunLedger,
    fields: &[String],
) -> RowOutcome
where
    D: UserDirectory,
    S: SeenStore,
    A: AuditSink,
{
    let row = match extractor.extract(fields) {
        Ok(row) => row,
        Err(err) => {
            log::error!(
                "Skipping short row (expected at least {} fields): {:?}",
                MIN_FIELD_COUNT,
                fields
            );
            ledger.count_error();
            return RowOutcome::Failed(err);
        }
    };

    let result = upsert_row(directory, &row);
    match &result.outcome {
        RowOutcome::Created => ledger.count_add(),
        RowOutcome::Updated => ledger.count_update(),
        // Routine race with a concurrent writer: not logged, not counted.
        RowOutcome::BenignConflict => {}
        RowOutcome::Failed(err) => {
            audit.record(AUDIT_SOURCE, &err.to_string());
            log::error!("person sync: {}", err);
            ledger.count_error();
        }
    }

    if let Some(internal_id) = &result.seen_id {
        if let Err(err) = ledger.record_seen(seen, &row.external_key, internal_id) {
            audit.record(AUDIT_SOURCE, &err.to_string());
            log::error!("person sync: {}", err);
            ledger.count_error();
        }
    }

    result.outcome
}

/// Create-or-update one parsed row against the directory.
pub(crate) fn upsert_row<D: UserDirectory>(directory: &mut D, row: &PersonRow) -> UpsertResult {
    let existing = match directory.lookup(&row.external_key) {
        Ok(existing) => existing,
        Err(err) => {
            return UpsertResult {
                outcome: RowOutcome::Failed(err),
                seen_id: None,
            };
        }
    };

    match apply_row(directory, row, existing.as_deref()) {
        Ok(assigned_id) => UpsertResult {
            outcome: if existing.is_some() {
                RowOutcome::Updated
            } else {
                RowOutcome::Created
            },
            seen_id: Some(assigned_id),
        },
        Err(SyncError::IdentityAlreadyDefined(_)) => {
            // The concurrent writer owns the entry now; later sweeps must
            // target whatever id it ended up with.
            let seen_id = directory.lookup(&row.external_key).ok().flatten();
            UpsertResult {
                outcome: RowOutcome::BenignConflict,
                seen_id,
            }
        }
        Err(err) => UpsertResult {
            outcome: RowOutcome::Failed(err),
            seen_id: None,
        },
    }
}

fn apply_row<D: UserDirectory>(
    directory: &mut D,
    row: &PersonRow,
    existing: Option<&str>,
) -> Result<String> {
    // The identity-seed field is only consulted for first-time identities;
    // an existing entry's internal id is never rewritten from the feed.
    let mut entry = match existing {
        Some(internal_id) => directory.open_for_edit(internal_id)?,
        None => directory.create(row.seed_id(), &row.external_key)?,
    };
    let assigned_id = entry.id().to_string();

    entry.set_first_name(&row.first_name);
    entry.set_last_name(&row.last_name);
    entry.set_email(&row.email);
    entry.set_credential(&row.credential);
    entry.set_type(&row.person_type);

    if !row.optional.is_empty() {
        log::debug!(
            "Processing optional fields for '{}': {:?}",
            row.external_key,
            row.optional
        );
        for (name, value) in &row.optional {
            if name.as_str() == ID_FIELD_NAME {
                continue;
            }
            match value {
                Some(v) if !v.is_empty() => entry.set_property(name, v),
                // Omission deletes: optional fields are feed-authoritative.
                _ => entry.remove_property(name),
            }
        }
    }

    directory.commit(entry)?;
    Ok(assigned_id)
}

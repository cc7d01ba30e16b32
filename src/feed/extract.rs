use std::collections::HashMap;

use crate::core::{Result, SyncError};
use crate::feed::row::PersonRow;

/// Minimum mandatory column count: external key, last name, first name,
/// email, credential, type.
pub const MIN_FIELD_COUNT: usize = 6;

/// Optional-column layout resolved once from configuration.
///
/// Position in the configured list is the column offset past the mandatory
/// boundary. Blank names discard their column; when a name appears twice the
/// later column wins.
#[derive(Debug, Clone)]
pub struct OptionalFieldSpec {
    /// Every configured non-blank name, used to pre-seed the row map
    names: Vec<String>,
    /// (name, absolute column index) pairs in configured order
    columns: Vec<(String, usize)>,
}

impl OptionalFieldSpec {
    pub fn resolve(configured: &[String]) -> Self {
        // A single empty name is how an empty list is typically injected.
        if configured.is_empty() || (configured.len() == 1 && configured[0].is_empty()) {
            return Self {
                names: Vec::new(),
                columns: Vec::new(),
            };
        }

        let mut names = Vec::new();
        let mut columns = Vec::new();
        for (position, name) in configured.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            if !names.contains(name) {
                names.push(name.clone());
            }
            columns.push((name.clone(), MIN_FIELD_COUNT + position));
        }
        Self { names, columns }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Map every configured name to its value in this row.
    ///
    /// Names are pre-seeded as absent so a configured field missing from the
    /// row is explicitly represented; that is what preserves delete-on-absence
    /// semantics downstream.
    pub fn overlay(&self, fields: &[String]) -> HashMap<String, Option<String>> {
        let mut named = HashMap::new();
        for name in &self.names {
            named.insert(name.clone(), None);
        }
        for (name, column) in &self.columns {
            if let Some(value) = fields.get(*column) {
                named.insert(name.clone(), Some(value.clone()));
            }
        }
        named
    }
}

/// Parses normalized, pre-tokenized feed rows into `PersonRow` values.
///
/// Expected layout: `externalKey, lastName, firstName, email, credential,
/// type[, optional...]`. Tokenization itself is the transport's job.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    spec: OptionalFieldSpec,
}

impl FieldExtractor {
    pub fn new(spec: OptionalFieldSpec) -> Self {
        Self { spec }
    }

    /// Parse one row. Columns are trimmed of surrounding whitespace before
    /// use; rows below `MIN_FIELD_COUNT` fail with `ShortRow` and are skipped.
    pub fn extract(&self, fields: &[String]) -> Result<PersonRow> {
        if fields.len() < MIN_FIELD_COUNT {
            return Err(SyncError::ShortRow {
                expected: MIN_FIELD_COUNT,
                found: fields.len(),
            });
        }

        let trimmed: Vec<String> = fields.iter().map(|f| f.trim().to_string()).collect();
        let optional = self.spec.overlay(&trimmed);

        Ok(PersonRow {
            external_key: trimmed[0].clone(),
            last_name: trimmed[1].clone(),
            first_name: trimmed[2].clone(),
            email: trimmed[3].clone(),
            credential: trimmed[4].clone(),
            person_type: trimmed[5].clone(),
            optional,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn extractor(names: &[&str]) -> FieldExtractor {
        let configured: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        FieldExtractor::new(OptionalFieldSpec::resolve(&configured))
    }

    #[test]
    fn short_row_is_rejected() {
        let extractor = extractor(&[]);
        let err = extractor
            .extract(&fields(&["bob", "Bobson", "Bob", "bob@x.com", "pw1"]))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::core::SyncError::ShortRow {
                expected: 6,
                found: 5
            }
        ));
    }

    #[test]
    fn mandatory_fields_are_trimmed() {
        let extractor = extractor(&[]);
        let row = extractor
            .extract(&fields(&[
                " bob ", "Bobson", " Bob", "bob@x.com ", "pw1", "staff ",
            ]))
            .unwrap();
        assert_eq!(row.external_key, "bob");
        assert_eq!(row.first_name, "Bob");
        assert_eq!(row.email, "bob@x.com");
        assert_eq!(row.person_type, "staff");
    }

    #[test]
    fn configured_names_preseed_as_absent() {
        let extractor = extractor(&["id", "dept"]);
        let row = extractor
            .extract(&fields(&["bob", "Bobson", "Bob", "bob@x.com", "pw1", "staff"]))
            .unwrap();
        assert_eq!(row.optional.get("id"), Some(&None));
        assert_eq!(row.optional.get("dept"), Some(&None));
    }

    #[test]
    fn optional_columns_overlay_in_order() {
        let extractor = extractor(&["id", "dept"]);
        let row = extractor
            .extract(&fields(&[
                "al", "Alson", "Al", "al@x.com", "pw2", "staff", "u-al", "CS",
            ]))
            .unwrap();
        assert_eq!(row.optional.get("id"), Some(&Some("u-al".to_string())));
        assert_eq!(row.optional.get("dept"), Some(&Some("CS".to_string())));
        assert_eq!(row.seed_id(), Some("u-al"));
    }

    #[test]
    fn blank_configured_name_discards_its_column() {
        let extractor = extractor(&["", "dept"]);
        let row = extractor
            .extract(&fields(&[
                "al", "Alson", "Al", "al@x.com", "pw2", "staff", "ignored", "CS",
            ]))
            .unwrap();
        assert_eq!(row.optional.len(), 1);
        assert_eq!(row.optional.get("dept"), Some(&Some("CS".to_string())));
    }

    #[test]
    fn duplicate_name_keeps_later_column() {
        let extractor = extractor(&["dept", "dept"]);
        let row = extractor
            .extract(&fields(&[
                "al", "Alson", "Al", "al@x.com", "pw2", "staff", "CS", "Math",
            ]))
            .unwrap();
        assert_eq!(row.optional.get("dept"), Some(&Some("Math".to_string())));
    }

    #[test]
    fn excess_columns_beyond_configured_names_are_dropped() {
        let extractor = extractor(&["dept"]);
        let row = extractor
            .extract(&fields(&[
                "al", "Alson", "Al", "al@x.com", "pw2", "staff", "CS", "extra",
            ]))
            .unwrap();
        assert_eq!(row.optional.len(), 1);
        assert_eq!(row.optional.get("dept"), Some(&Some("CS".to_string())));
    }

    #[test]
    fn single_empty_name_means_no_optional_fields() {
        let extractor = extractor(&[""]);
        let row = extractor
            .extract(&fields(&[
                "al", "Alson", "Al", "al@x.com", "pw2", "staff", "CS",
            ]))
            .unwrap();
        assert!(row.optional.is_empty());
    }

    #[test]
    fn empty_seed_value_does_not_seed() {
        let extractor = extractor(&["id"]);
        let row = extractor
            .extract(&fields(&[
                "al", "Alson", "Al", "al@x.com", "pw2", "staff", "  ",
            ]))
            .unwrap();
        assert_eq!(row.seed_id(), None);
    }
}

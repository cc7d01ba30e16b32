use std::collections::HashMap;

use crate::config::ID_FIELD_NAME;

/// One parsed feed row. Ephemeral: lives for the duration of processing
/// that row, then the directory is the only holder of its data.
#[derive(Debug, Clone)]
pub struct PersonRow {
    /// Feed-provided unique identifier, used to resolve an existing entry
    pub external_key: String,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub credential: String,
    pub person_type: String,
    /// Every configured optional field; `None` means the feed omitted the
    /// value this run, which downstream treats as a delete.
    pub optional: HashMap<String, Option<String>>,
}

impl PersonRow {
    /// Value of the identity-seed column, if configured and non-empty.
    pub fn seed_id(&self) -> Option<&str> {
        match self.optional.get(ID_FIELD_NAME) {
            Some(Some(value)) if !value.is_empty() => Some(value.as_str()),
            _ => None,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::core::{Result, SyncError};

/// Reserved optional-column name: when a row carries a value in the column
/// configured under this name and the identity does not exist yet, that value
/// seeds the new entry's internal id. Existing ids are never changed by it.
pub const ID_FIELD_NAME: &str = "id";

/// Reconciliation run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Optional column names, position-significant past the mandatory fields.
    /// An empty string discards that column; `ID_FIELD_NAME` enables seeding.
    pub optional_field_names: Vec<String>,

    /// Remove stale identities outright instead of suspending them
    pub delete_users: bool,

    /// Type marker written to identities suspended by the sweep
    pub suspended_type: String,

    /// Page size for stale-record queries during the sweep
    pub search_page_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            optional_field_names: vec![ID_FIELD_NAME.to_string()],
            delete_users: false,
            suspended_type: "suspended".to_string(),
            search_page_size: 1000,
        }
    }
}

impl SyncConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the optional column name list
    pub fn optional_field_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_field_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Remove stale identities instead of suspending them
    pub fn delete_users(mut self, delete: bool) -> Self {
        self.delete_users = delete;
        self
    }

    /// Set the suspended type marker
    pub fn suspended_type(mut self, marker: &str) -> Self {
        self.suspended_type = marker.to_string();
        self
    }

    /// Set the sweep page size
    pub fn search_page_size(mut self, size: usize) -> Self {
        self.search_page_size = size;
        self
    }

    /// Load a configuration from a JSON document; absent keys keep defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SyncError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.search_page_size == 0 {
            return Err(SyncError::ConfigError(
                "search_page_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

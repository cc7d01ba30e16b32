//! User directory collaborator contract.
//!
//! The real directory lives outside this crate; `InMemoryDirectory` is the
//! reference backend used by tests and embedded callers.

pub mod memory;

pub use memory::{InMemoryDirectory, UserEdit, UserRecord};

use crate::core::Result;

/// An open directory entry, staged for mutation until committed.
pub trait DirectoryEntry {
    /// Internal id the directory assigned to this entry
    fn id(&self) -> &str;

    /// External key the entry was created under
    fn external_key(&self) -> &str;

    fn set_last_name(&mut self, value: &str);
    fn set_first_name(&mut self, value: &str);
    fn set_email(&mut self, value: &str);
    fn set_credential(&mut self, value: &str);
    fn set_type(&mut self, value: &str);

    /// Set or replace a named property
    fn set_property(&mut self, name: &str, value: &str);

    /// Remove a named property if present
    fn remove_property(&mut self, name: &str);
}

/// Persistent directory of person records.
///
/// All operations are synchronous and blocking. Each commit is its own
/// transaction; there is no cross-entry transaction.
pub trait UserDirectory {
    type Entry: DirectoryEntry;

    /// Resolve an external key to the internal id of an existing entry.
    ///
    /// `Ok(None)` is the expected signal for first-time keys and must stay
    /// distinct from lookup failures.
    fn lookup(&self, external_key: &str) -> Result<Option<String>>;

    /// Stage a new entry keyed by `external_key`. When `seed_id` is given the
    /// directory may honor it as the internal id or assign its own; callers
    /// must read the id back from the returned entry.
    fn create(&mut self, seed_id: Option<&str>, external_key: &str) -> Result<Self::Entry>;

    /// Open an existing entry for editing
    fn open_for_edit(&mut self, internal_id: &str) -> Result<Self::Entry>;

    /// Persist a staged entry
    fn commit(&mut self, entry: Self::Entry) -> Result<()>;

    /// Remove a staged entry from the directory
    fn remove(&mut self, entry: Self::Entry) -> Result<()>;
}

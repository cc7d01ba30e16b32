use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::core::{Result, SyncError};
use crate::directory::{DirectoryEntry, UserDirectory};

/// Stored person record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub internal_id: String,
    pub external_key: String,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    /// bcrypt hash of the last committed credential
    pub credential_hash: String,
    pub person_type: String,
    pub properties: HashMap<String, String>,
}

impl UserRecord {
    fn new(internal_id: String, external_key: String) -> Self {
        Self {
            internal_id,
            external_key,
            last_name: String::new(),
            first_name: String::new(),
            email: String::new(),
            credential_hash: String::new(),
            person_type: String::new(),
            properties: HashMap::new(),
        }
    }
}

/// A staged edit of a user record. Changes become visible on commit.
#[derive(Debug, Clone)]
pub struct UserEdit {
    record: UserRecord,
    is_new: bool,
    /// Plaintext credential staged by `set_credential`, hashed on commit
    pending_credential: Option<String>,
}

impl DirectoryEntry for UserEdit {
    fn id(&self) -> &str {
        &self.record.internal_id
    }

    fn external_key(&self) -> &str {
        &self.record.external_key
    }

    fn set_last_name(&mut self, value: &str) {
        self.record.last_name = value.to_string();
    }

    fn set_first_name(&mut self, value: &str) {
        self.record.first_name = value.to_string();
    }

    fn set_email(&mut self, value: &str) {
        self.record.email = value.to_string();
    }

    fn set_credential(&mut self, value: &str) {
        self.pending_credential = Some(value.to_string());
    }

    fn set_type(&mut self, value: &str) {
        self.record.person_type = value.to_string();
    }

    fn set_property(&mut self, name: &str, value: &str) {
        self.record.properties.insert(name.to_string(), value.to_string());
    }

    fn remove_property(&mut self, name: &str) {
        self.record.properties.remove(name);
    }
}

/// In-memory user directory.
///
/// Backs tests and embedded use. Credentials are stored as bcrypt hashes;
/// `lock` and `set_read_only` let callers exercise the locked and
/// permission-denied failure paths a real directory would raise.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    /// Records by internal id
    users: HashMap<String, UserRecord>,
    /// External key -> internal id
    key_index: HashMap<String, String>,
    /// Internal ids held open by some other editor
    locked: HashSet<String>,
    read_only: bool,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock an entry, as another editor holding it open would
    pub fn lock(&mut self, internal_id: &str) {
        self.locked.insert(internal_id.to_string());
    }

    pub fn unlock(&mut self, internal_id: &str) {
        self.locked.remove(internal_id);
    }

    /// Refuse all mutation, as a caller without directory permissions sees it
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn get(&self, internal_id: &str) -> Option<&UserRecord> {
        self.users.get(internal_id)
    }

    pub fn get_by_key(&self, external_key: &str) -> Option<&UserRecord> {
        self.key_index
            .get(external_key)
            .and_then(|id| self.users.get(id))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Verify a plaintext credential against the stored hash
    pub fn verify_credential(&self, external_key: &str, credential: &str) -> bool {
        match self.get_by_key(external_key) {
            Some(record) => bcrypt::verify(credential, &record.credential_hash).unwrap_or(false),
            None => false,
        }
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(SyncError::PermissionDenied(
                "directory is read-only".to_string(),
            ));
        }
        Ok(())
    }

    fn check_unlocked(&self, internal_id: &str) -> Result<()> {
        if self.locked.contains(internal_id) {
            return Err(SyncError::IdentityLocked(internal_id.to_string()));
        }
        Ok(())
    }
}

impl UserDirectory for InMemoryDirectory {
    type Entry = UserEdit;

    fn lookup(&self, external_key: &str) -> Result<Option<String>> {
        Ok(self.key_index.get(external_key).cloned())
    }

    fn create(&mut self, seed_id: Option<&str>, external_key: &str) -> Result<UserEdit> {
        self.check_writable()?;
        if external_key.is_empty() {
            return Err(SyncError::IdentityInvalid(
                "external key must not be empty".to_string(),
            ));
        }
        if self.key_index.contains_key(external_key) {
            return Err(SyncError::IdentityAlreadyDefined(external_key.to_string()));
        }

        // A seed already in use as an internal id is rejected in favor of a
        // generated one; the caller reads the assigned id off the entry.
        let internal_id = match seed_id {
            Some(seed) if !seed.is_empty() && !self.users.contains_key(seed) => seed.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        Ok(UserEdit {
            record: UserRecord::new(internal_id, external_key.to_string()),
            is_new: true,
            pending_credential: None,
        })
    }

    fn open_for_edit(&mut self, internal_id: &str) -> Result<UserEdit> {
        if internal_id.is_empty() {
            return Err(SyncError::IdentityInvalid(
                "internal id must not be empty".to_string(),
            ));
        }
        self.check_unlocked(internal_id)?;
        let record = self
            .users
            .get(internal_id)
            .ok_or_else(|| SyncError::IdentityNotDefined(internal_id.to_string()))?
            .clone();
        Ok(UserEdit {
            record,
            is_new: false,
            pending_credential: None,
        })
    }

    fn commit(&mut self, mut entry: UserEdit) -> Result<()> {
        self.check_writable()?;
        self.check_unlocked(&entry.record.internal_id)?;
        if entry.is_new {
            // The key may have been claimed between create and commit.
            if self.key_index.contains_key(&entry.record.external_key) {
                return Err(SyncError::IdentityAlreadyDefined(
                    entry.record.external_key.clone(),
                ));
            }
        }
        if let Some(plain) = entry.pending_credential.take() {
            entry.record.credential_hash = bcrypt::hash(&plain, bcrypt::DEFAULT_COST)
                .map_err(|e| SyncError::StorageError(format!("Failed to hash credential: {}", e)))?;
        }
        self.key_index.insert(
            entry.record.external_key.clone(),
            entry.record.internal_id.clone(),
        );
        self.users
            .insert(entry.record.internal_id.clone(), entry.record);
        Ok(())
    }

    fn remove(&mut self, entry: UserEdit) -> Result<()> {
        self.check_writable()?;
        self.check_unlocked(&entry.record.internal_id)?;
        if !self.users.contains_key(&entry.record.internal_id) {
            return Err(SyncError::IdentityNotDefined(
                entry.record.internal_id.clone(),
            ));
        }
        self.key_index.remove(&entry.record.external_key);
        self.users.remove(&entry.record.internal_id);
        Ok(())
    }
}

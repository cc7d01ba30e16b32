use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Short row: expected at least {expected} fields, found {found}")]
    ShortRow { expected: usize, found: usize },

    #[error("Invalid identity id: {0}")]
    IdentityInvalid(String),

    #[error("Identity '{0}' is not defined")]
    IdentityNotDefined(String),

    #[error("Identity '{0}' is already defined")]
    IdentityAlreadyDefined(String),

    #[error("Identity '{0}' is locked by another edit")]
    IdentityLocked(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

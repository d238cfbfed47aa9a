/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use bantay_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "location",
///     id: "7321".to_string(),
/// };
/// assert!(err.to_string().contains("location"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found in the database.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness or foreign key constraint rejected the write.
    #[error("Storage: conflict: {0}")]
    Conflict(String),

    /// An underlying SQLite error.
    #[error("Storage: SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Password or PIN hashing failed.
    #[error("Storage: credential hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// Generic storage error for cases not covered by other variants.
    #[error("Storage: {0}")]
    Other(String),
}

impl StorageError {
    /// Maps SQLite constraint violations to [`StorageError::Conflict`].
    pub(crate) fn from_write(err: rusqlite::Error, entity: &'static str) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, ref msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::Conflict(format!(
                    "{entity}: {}",
                    msg.as_deref().unwrap_or("constraint violation")
                ))
            }
            other => StorageError::Sqlite(other),
        }
    }
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

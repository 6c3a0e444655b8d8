use thiserror::Error;

/// Errors returned by storage backends.
///
/// `NotFound` and `AlreadyExists` carry the short code involved. Every other
/// variant is a storage fault: the shortener passes it through unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("short code already exists: {0}")]
    AlreadyExists(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Returns `true` for backend faults, `false` for `NotFound` and `AlreadyExists`.
    pub fn is_fault(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::AlreadyExists(_))
    }
}

/// Errors returned by the shortener service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("short code already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("short code generation failed: {0}")]
    Generator(String),
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(code) => Self::NotFound(code),
            StorageError::AlreadyExists(code) => Self::AlreadyExists(code),
            fault => Self::Storage(fault),
        }
    }
}

use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Backend-assigned surrogate key. Monotonic and never reused.
    pub id: i64,
    /// Unique lookup key, immutable after creation.
    pub short_code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// Number of redirects served for this code.
    pub clicks: u64,
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the code was last resolved, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<Timestamp>,
}

/// The caller-controlled part of a record, passed to [`Repository::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrl {
    pub short_code: ShortCode,
    pub original_url: String,
}

impl NewUrl {
    pub fn new(short_code: ShortCode, original_url: impl Into<String>) -> Self {
        Self {
            short_code,
            original_url: original_url.into(),
        }
    }

    /// Builds the full record a backend stores on create.
    pub fn into_record(self, id: i64, created_at: Timestamp) -> UrlRecord {
        UrlRecord {
            id,
            short_code: self.short_code,
            original_url: self.original_url,
            clicks: 0,
            created_at,
            last_accessed: None,
        }
    }
}

/// Storage backend contract.
///
/// Every backend must produce the same error kinds for the same situations:
/// `AlreadyExists` from `create` on a live code, `NotFound` from `read`,
/// `update` and `delete` on a missing one. Anything else is a storage fault.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new record.
    ///
    /// The backend assigns `id` and `created_at` and starts `clicks` at zero.
    /// Returns `Err(AlreadyExists)` if the code is already live. The existence
    /// check and the insert are atomic with respect to concurrent creators.
    async fn create(&self, new_url: NewUrl) -> Result<UrlRecord>;

    /// Retrieves the record for a short code, or `Err(NotFound)`.
    async fn read(&self, code: &ShortCode) -> Result<UrlRecord>;

    /// Overwrites `original_url`, `clicks` and `last_accessed` of the record
    /// identified by `record.short_code`. `id` and `created_at` are left alone.
    async fn update(&self, record: &UrlRecord) -> Result<()>;

    /// Removes the record. The code becomes available to future creates.
    async fn delete(&self, code: &ShortCode) -> Result<()>;

    /// Returns up to `limit` records after skipping `offset`.
    ///
    /// An offset past the end yields an empty vector.
    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<UrlRecord>>;

    /// Releases backend resources. Safe to call more than once.
    async fn close(&self) -> Result<()>;
}

use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL.
    ///
    /// With `custom_code`, exactly one create is attempted and a collision is
    /// returned as `AlreadyExists`. Without it, a code is generated and
    /// regenerated on collision a bounded number of times.
    async fn shorten(
        &self,
        original_url: String,
        custom_code: Option<ShortCode>,
    ) -> Result<UrlRecord>;

    /// Resolves a short code for a redirect and counts the click.
    ///
    /// The click is persisted in the background; the caller does not wait for it.
    async fn resolve(&self, code: &ShortCode) -> Result<UrlRecord>;

    /// Returns the stored record without counting a click.
    async fn stats(&self, code: &ShortCode) -> Result<UrlRecord>;

    /// Deletes a shortened URL by its short code.
    async fn remove(&self, code: &ShortCode) -> Result<()>;

    /// Lists records. A non-positive `limit` becomes 10, a negative `offset` 0.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>>;

    /// Closes the underlying storage. Only the first call has an effect.
    async fn shutdown(&self) -> Result<()>;
}

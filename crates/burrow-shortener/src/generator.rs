pub mod random;

use burrow_core::{ShortCode, ShortenerError};

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is not required: the service retries a create that collides
/// with a live code.
pub trait Generator: Send + Sync + 'static {
    /// Produces a candidate short code.
    fn generate(&self) -> Result<ShortCode, ShortenerError>;
}

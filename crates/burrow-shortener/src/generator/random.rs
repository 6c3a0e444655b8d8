use crate::generator::Generator;
use base64::Engine as _;
use burrow_core::{ShortCode, ShortenerError};

/// Length used when none is configured.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Random short code generator backed by the operating system's CSPRNG.
///
/// Draws `length` random bytes, encodes them as URL-safe base64 without
/// padding and keeps the first `length` characters, so codes only contain
/// `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator producing codes of exactly `length` characters.
    ///
    /// A zero length falls back to [`DEFAULT_CODE_LENGTH`].
    pub fn new(length: usize) -> Self {
        let length = if length == 0 {
            DEFAULT_CODE_LENGTH
        } else {
            length
        };
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> Result<ShortCode, ShortenerError> {
        let mut buffer = vec![0u8; self.length];
        getrandom::fill(&mut buffer).map_err(|e| ShortenerError::Generator(e.to_string()))?;

        let mut code = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&buffer);
        code.truncate(self.length);
        Ok(ShortCode::new_unchecked(code))
    }
}

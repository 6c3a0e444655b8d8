//! URL shortener service implementation.
//!
//! This crate provides [`ShortenerService`] and the short code generators it
//! draws from. Core types are re-exported from `burrow_core`.

pub mod clicks;
pub mod generator;
pub mod service;

pub use burrow_core::{ShortCode, Shortener, ShortenerError, UrlRecord};
pub use generator::random::RandomGenerator;
pub use generator::Generator;
pub use service::ShortenerService;

//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the record model, the storage backend contract and
//! the shortener contract shared by the storage backends, the shortener
//! service and the HTTP gateway.

pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{ShortenerError, StorageError};
pub use repository::{NewUrl, Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use shortener::Shortener;

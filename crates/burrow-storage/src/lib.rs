//! Storage backends for the Burrow URL shortener.
//!
//! All three backends implement [`Repository`] with identical semantics:
//!
//! - [`InMemoryRepository`]: a lock-protected map, volatile.
//! - [`SqliteRepository`]: a single SQLite file (or a private in-memory database).
//! - [`PostgresRepository`]: a PostgreSQL server.

pub mod memory;
pub mod postgres;
mod sql;
pub mod sqlite;

pub use burrow_core::error::StorageError;
pub use burrow_core::repository::{NewUrl, Repository, Result, UrlRecord};
pub use memory::InMemoryRepository;
pub use postgres::{PostgresPoolSettings, PostgresRepository};
pub use sqlite::SqliteRepository;

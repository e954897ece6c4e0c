//! # Relmap - typed relationship mapping over SQLite
//!
//! A small data layer that demonstrates relationship modeling on an
//! ephemeral in-memory database.
//!
//! Relmap provides:
//! - Table, column and index definitions with DDL rendering
//! - An explicit schema builder (no global registry)
//! - Strongly-typed relationship descriptors compiled at schema-build time
//! - A storage session with add/commit/link/query primitives
//! - Three runnable scenarios: many-to-many and two one-to-many variants

pub mod id;
pub mod schema;
pub mod record;
pub mod relation;
pub mod storage;
pub mod models;
pub mod scenario;
pub mod config;
pub mod logging;
pub mod ui;

// Re-exports for convenient access
pub use id::ExternalId;
pub use record::Record;
pub use relation::{Cardinality, Join, Relationship, Side};
pub use schema::{Schema, SchemaBuilder};
pub use storage::Session;
pub use scenario::{Report, Scenario};

/// Result type alias for Relmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Relmap operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid external id: {0}")]
    InvalidExternalId(String),

    #[error("Record in {0} is already persisted")]
    AlreadyPersisted(String),

    #[error("Record in {0} has not been persisted")]
    NotPersisted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True when SQLite rejected a statement on a UNIQUE, PRIMARY KEY or
    /// NOT NULL constraint
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::Storage(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

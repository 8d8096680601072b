//! Error types for the SQLite persistence engine.
//!
//! Registration-time variants ([`InvalidSchema`](StoreError::InvalidSchema),
//! [`DuplicateEntity`](StoreError::DuplicateEntity),
//! [`NameMismatch`](StoreError::NameMismatch)) are structural: the entity
//! cannot be used. Everything else is reported by the strict `try_*`
//! operations and swallowed (after logging) by the lenient ones.

use std::path::PathBuf;

use entity_store_core::ValidationError;
use thiserror::Error;

/// Errors that can occur in the persistence engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// The entity description failed validation.
    #[error("invalid entity: {0}")]
    InvalidSchema(#[from] ValidationError),

    /// An entity with this name is already registered.
    #[error("entity already registered: {0}")]
    DuplicateEntity(String),

    /// No entity with this name was registered.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// `Entity::schema()` returned a description whose name differs from
    /// `Entity::NAME`.
    #[error("entity {declared} describes itself as {schema}")]
    NameMismatch {
        /// `Entity::NAME`.
        declared: String,
        /// Name inside the returned schema.
        schema: String,
    },

    /// Caller-supplied key tuple has the wrong arity.
    #[error("inconsistent number of keys for {entity}: expected {expected}, got {actual}")]
    KeyCountMismatch {
        /// Entity name.
        entity: String,
        /// Number of key fields.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Caller-supplied row has the wrong number of values.
    #[error("inconsistent number of values for {entity}: expected {expected}, got {actual}")]
    FieldCountMismatch {
        /// Entity name.
        entity: String,
        /// Number of persisted fields.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A column value could not be decoded into its field.
    #[error("conversion error for {entity}.{field}: {message}")]
    ConversionError {
        /// Entity name.
        entity: String,
        /// Field name.
        field: String,
        /// What went wrong.
        message: String,
    },

    /// The database file does not exist and creation is disabled.
    #[error("database file not found: {}", .0.display())]
    DatabaseMissing(PathBuf),

    /// Filesystem failure while preparing the database location.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration or table description failure.
    #[error("config error: {0}")]
    ConfigError(#[from] entity_store_db::DatabaseError),
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;

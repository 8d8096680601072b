//! Error types for configuration and table description loading.

use entity_store_core::ValidationError;
use thiserror::Error;

/// Errors that can occur while loading configuration or table descriptions.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration is readable but unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A table description does not describe a storable entity.
    #[error("invalid table description: {0}")]
    SchemaError(#[from] ValidationError),

    /// Two description files declare the same table.
    #[error("duplicate table description: {0}")]
    DuplicateTable(String),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;

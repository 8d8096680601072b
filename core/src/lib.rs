//! Core types for describing persisted record types.
//!
//! This crate defines everything the storage engine needs to know about a
//! record type without touching a database:
//!
//! - [`EntitySchema`]: ordered field list for one record type, built once
//!   at registration time instead of discovered by runtime introspection.
//! - [`FieldSchema`] / [`FieldFlags`]: one persisted (or ignored) attribute
//!   with its key, not-null, index, blob, and ignore markers.
//! - [`SemanticType`]: the closed set of field types the engine can store.
//! - [`Value`]: a single field value crossing the engine boundary.
//! - [`Entity`]: the trait a Rust type implements to be stored.
//!
//! The type mapper ([`map_field`]) turns a field into its column type and
//! in-memory storage kind; [`validate_schema`] catches structural problems
//! such as a missing key or an unsupported type before any SQL is emitted.
//!
//! # Example
//!
//! ```
//! use entity_store_core::*;
//!
//! let schema = EntitySchema::new("Score")
//!     .with_field(FieldSchema::new("id", SemanticType::Int).key())
//!     .with_field(FieldSchema::new("name", SemanticType::Text))
//!     .with_field(FieldSchema::new("score", SemanticType::Double))
//!     .with_field(FieldSchema::new("cached", SemanticType::Text).ignored());
//!
//! assert!(validate_schema(&schema).is_empty());
//! assert_eq!(schema.persisted_fields().count(), 3);
//! assert_eq!(schema.key_fields().count(), 1);
//! ```

mod entity;
mod mapping;
mod types;
mod validate;
mod value;

pub use entity::Entity;
pub use mapping::{ColumnType, FieldMapping, StorageKind, map_field};
pub use types::{EntitySchema, FieldFlags, FieldSchema, SemanticType};
pub use validate::{ValidationError, validate_identifier, validate_schema};
pub use value::{Value, ValueError};

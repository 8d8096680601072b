//! Structural validation of entity descriptions.
//!
//! Catches problems that make an [`EntitySchema`] unusable as a table
//! definition: an empty or malformed name, duplicate fields, fields whose
//! type cannot be mapped, and a missing or ignored primary key. All of these
//! are registration-time errors.
//!
//! # Examples
//!
//! ```
//! use entity_store_core::*;
//!
//! let ok = EntitySchema::new("Tag")
//!     .with_field(FieldSchema::new("id", SemanticType::Int).key());
//! assert!(validate_schema(&ok).is_empty());
//!
//! let keyless = EntitySchema::new("Tag")
//!     .with_field(FieldSchema::new("id", SemanticType::Int));
//! assert_eq!(
//!     validate_schema(&keyless),
//!     vec![ValidationError::MissingKey("Tag".into())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{EntitySchema, map_field};

/// Entity description errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Entity name is empty or whitespace-only.
    #[error("entity name cannot be empty")]
    EmptyEntityName,
    /// Name contains characters other than ASCII alphanumerics and underscores,
    /// or starts with a digit.
    #[error("invalid identifier '{0}': must be alphanumeric/underscore and not start with a digit")]
    InvalidIdentifier(String),
    /// Two fields of the same entity share a name.
    #[error("duplicate field '{field}' in {entity}")]
    DuplicateField {
        /// Owning entity.
        entity: String,
        /// Repeated field name.
        field: String,
    },
    /// No persisted field carries the key marker.
    #[error("missing key for entity {0}")]
    MissingKey(String),
    /// A field is marked both key and ignored.
    #[error("key field '{field}' of {entity} cannot be ignored")]
    IgnoredKey {
        /// Owning entity.
        entity: String,
        /// Offending field.
        field: String,
    },
    /// The field's type cannot be stored.
    #[error("unsupported type {ty} for field '{field}' of {entity}")]
    UnsupportedType {
        /// Owning entity.
        entity: String,
        /// Offending field.
        field: String,
        /// Declared type.
        ty: String,
    },
}

/// Checks that `name` is usable as a table or column name.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIdentifier`] for empty names, names
/// starting with a digit, or names with characters outside `[A-Za-z0-9_]`.
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier(name.to_string()))
    }
}

/// Validates an entity description.
///
/// Returns every problem found; an empty vector means the schema can be
/// registered.
pub fn validate_schema(schema: &EntitySchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if schema.name.trim().is_empty() {
        errors.push(ValidationError::EmptyEntityName);
        return errors;
    }
    if let Err(e) = validate_identifier(&schema.name) {
        errors.push(e);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.name.as_str()) {
            errors.push(ValidationError::DuplicateField {
                entity: schema.name.clone(),
                field: field.name.clone(),
            });
        }
        if field.is_key() && !field.is_persisted() {
            errors.push(ValidationError::IgnoredKey {
                entity: schema.name.clone(),
                field: field.name.clone(),
            });
        }
        if !field.is_persisted() {
            continue;
        }
        if let Err(e) = validate_identifier(&field.name) {
            errors.push(e);
        }
        if let Err(e) = map_field(&schema.name, field) {
            errors.push(e);
        }
    }

    if schema.key_fields().next().is_none() {
        errors.push(ValidationError::MissingKey(schema.name.clone()));
    }

    errors
}

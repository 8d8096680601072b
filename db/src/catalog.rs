//! Table descriptions loaded from YAML files.
//!
//! A description file declares one table and its fields by type name, the
//! same way a record type would declare them in code:
//!
//! ```yaml
//! name: Reputation
//! fields:
//!   - { name: user, type: u64, key: true }
//!   - { name: tnk, type: i32 }
//!   - { name: last_update, type: datetime, index: true }
//! ```
//!
//! Type names go through [`SemanticType::from_type_name`]; an unknown name is
//! reported as [`ValidationError::UnsupportedType`].

use std::collections::BTreeMap;
use std::path::Path;

use entity_store_core::{EntitySchema, FieldFlags, FieldSchema, SemanticType, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, Result};

/// One field of a [`TableSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Declared type name (e.g. `i32`, `String`, `datetime`).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Field markers.
    #[serde(flatten)]
    pub flags: FieldFlags,
}

/// YAML description of one table.
///
/// # Examples
///
/// ```
/// use entity_store_db::TableSpec;
///
/// let spec: TableSpec = serde_yaml::from_str(r#"
/// name: Score
/// fields:
///   - { name: id, type: i32, key: true }
///   - { name: name, type: String }
/// "#).unwrap();
/// let schema = spec.into_schema().unwrap();
/// assert_eq!(schema.key_fields().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table (entity) name.
    pub name: String,
    /// Fields in column order.
    pub fields: Vec<FieldSpec>,
}

impl TableSpec {
    /// Loads a description from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) or
    /// [`YamlError`](DatabaseError::YamlError).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Resolves type names and builds the entity description.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`](DatabaseError::SchemaError) wrapping
    /// [`ValidationError::UnsupportedType`] for an unknown type name.
    pub fn into_schema(self) -> Result<EntitySchema> {
        let mut schema = EntitySchema::new(self.name);
        for field in self.fields {
            let ty = SemanticType::from_type_name(&field.type_name).ok_or_else(|| {
                ValidationError::UnsupportedType {
                    entity: schema.name.clone(),
                    field: field.name.clone(),
                    ty: field.type_name.clone(),
                }
            })?;
            schema.fields.push(FieldSchema {
                name: field.name,
                ty,
                flags: field.flags,
            });
        }
        Ok(schema)
    }
}

/// Every table description found in a directory, keyed by table name.
#[derive(Debug, Default)]
pub struct TableCatalog {
    schemas: BTreeMap<String, EntitySchema>,
}

impl TableCatalog {
    /// Loads every `*.yml` / `*.yaml` file in `path`.
    ///
    /// # Errors
    ///
    /// Returns the first I/O, YAML, or type resolution error, or
    /// [`DuplicateTable`](DatabaseError::DuplicateTable) if two files declare
    /// the same table.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let mut catalog = Self::default();

        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            let is_yaml = matches!(
                file_path.extension().and_then(|e| e.to_str()),
                Some("yml" | "yaml")
            );
            if is_yaml {
                catalog.insert(TableSpec::load(&file_path)?.into_schema()?)?;
            }
        }

        Ok(catalog)
    }

    /// Adds a schema to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateTable`](DatabaseError::DuplicateTable) if a schema
    /// with the same name is already present.
    pub fn insert(&mut self, schema: EntitySchema) -> Result<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(DatabaseError::DuplicateTable(schema.name));
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Looks up a table description by name.
    pub fn get(&self, name: &str) -> Option<&EntitySchema> {
        self.schemas.get(name)
    }

    /// Table names in sorted order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Schemas in table-name order.
    pub fn schemas(&self) -> impl Iterator<Item = &EntitySchema> {
        self.schemas.values()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no tables were found.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

//! Entity descriptors and their pre-built statement templates.
//!
//! An [`EntityDescriptor`] is built once per registered entity from its
//! [`EntitySchema`]. It keeps only the persisted fields, in declaration
//! order, and the SQL templates every CRUD operation binds values into.
//!
//! Parameters are positional. Row-shaped templates (`insert`, `update`) take
//! one parameter per persisted column, `?1..?n` in column order; the
//! `update` predicate reuses the key columns' own positions, so a single row
//! of values binds both the `SET` list and the `WHERE` clause. Key-shaped
//! templates (`exists`, `delete`, `select_one`) take the key values `?1..?k`
//! in key order.

use entity_store_core::{EntitySchema, FieldMapping, SemanticType, map_field, validate_schema};

use crate::error::{Result, StoreError};

/// One persisted column of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Field and column name.
    pub name: String,
    /// Declared semantic type.
    pub ty: SemanticType,
    /// Column type and decode kind.
    pub mapping: FieldMapping,
    /// Part of the primary key.
    pub key: bool,
    /// Carries `NOT NULL`.
    pub not_null: bool,
    /// Covered by the secondary index.
    pub indexed: bool,
}

/// SQL templates for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    /// `SELECT COUNT(*)` filtered by the key predicate.
    pub exists: String,
    /// Every persisted column of every row, ordered by key.
    pub select_all: String,
    /// Every persisted column of the row matching the key predicate.
    pub select_one: String,
    /// Insert one row.
    pub insert: String,
    /// Overwrite every persisted column of the row matching the key.
    pub update: String,
    /// Delete the row matching the key predicate.
    pub delete: String,
    /// Unfiltered `SELECT COUNT(*)`.
    pub count: String,
}

/// Cached metadata for one registered entity.
///
/// # Examples
///
/// ```
/// use entity_store_core::*;
/// use entity_store_sqlite::EntityDescriptor;
///
/// let schema = EntitySchema::new("Score")
///     .with_field(FieldSchema::new("id", SemanticType::Int).key())
///     .with_field(FieldSchema::new("name", SemanticType::Text))
///     .with_field(FieldSchema::new("scratch", SemanticType::Text).ignored());
///
/// let d = EntityDescriptor::build(&schema).unwrap();
/// assert_eq!(d.columns().len(), 2);
/// assert_eq!(
///     d.templates().insert,
///     r#"INSERT INTO "Score" ("id", "name") VALUES (?1, ?2)"#
/// );
/// assert_eq!(
///     d.templates().update,
///     r#"UPDATE "Score" SET "id" = ?1, "name" = ?2 WHERE "id" = ?1"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    name: String,
    columns: Vec<ColumnDescriptor>,
    key_positions: Vec<usize>,
    templates: Templates,
}

impl EntityDescriptor {
    /// Validates `schema` and builds its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSchema`] with the first validation
    /// problem, e.g. [`MissingKey`](entity_store_core::ValidationError::MissingKey)
    /// or [`UnsupportedType`](entity_store_core::ValidationError::UnsupportedType).
    pub fn build(schema: &EntitySchema) -> Result<Self> {
        if let Some(first) = validate_schema(schema).into_iter().next() {
            return Err(StoreError::InvalidSchema(first));
        }

        let mut columns = Vec::new();
        for field in schema.persisted_fields() {
            columns.push(ColumnDescriptor {
                name: field.name.clone(),
                ty: field.ty,
                mapping: map_field(&schema.name, field)?,
                key: field.is_key(),
                not_null: field.is_not_null(),
                indexed: field.flags.indexed,
            });
        }

        let key_positions: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.key)
            .map(|(i, _)| i)
            .collect();

        let templates = build_templates(&schema.name, &columns, &key_positions);

        Ok(Self {
            name: schema.name.clone(),
            columns,
            key_positions,
            templates,
        })
    }

    /// Entity and table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Persisted columns in column order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Key columns in key order.
    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.key_positions.iter().map(|&i| &self.columns[i])
    }

    /// Positions of the key columns within [`columns`](Self::columns).
    pub fn key_positions(&self) -> &[usize] {
        &self.key_positions
    }

    /// Number of key columns.
    pub fn key_arity(&self) -> usize {
        self.key_positions.len()
    }

    /// Indexed columns in column order.
    pub fn indexed_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.indexed)
    }

    /// Statement templates.
    pub fn templates(&self) -> &Templates {
        &self.templates
    }
}

/// Quotes an identifier. Names are validated, so no escaping is needed.
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

fn build_templates(table: &str, columns: &[ColumnDescriptor], keys: &[usize]) -> Templates {
    let table = quote(table);
    let column_list = columns
        .iter()
        .map(|c| quote(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let key_predicate = keys
        .iter()
        .enumerate()
        .map(|(n, &i)| format!("{} = ?{}", quote(&columns[i].name), n + 1))
        .collect::<Vec<_>>()
        .join(" AND ");

    let order_by = keys
        .iter()
        .map(|&i| quote(&columns[i].name))
        .collect::<Vec<_>>()
        .join(", ");

    let placeholders = (1..=columns.len())
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ");

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ?{}", quote(&c.name), i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let update_predicate = keys
        .iter()
        .map(|&i| format!("{} = ?{}", quote(&columns[i].name), i + 1))
        .collect::<Vec<_>>()
        .join(" AND ");

    Templates {
        exists: format!("SELECT COUNT(*) FROM {table} WHERE {key_predicate}"),
        select_all: format!("SELECT {column_list} FROM {table} ORDER BY {order_by}"),
        select_one: format!("SELECT {column_list} FROM {table} WHERE {key_predicate}"),
        insert: format!("INSERT INTO {table} ({column_list}) VALUES ({placeholders})"),
        update: format!("UPDATE {table} SET {assignments} WHERE {update_predicate}"),
        delete: format!("DELETE FROM {table} WHERE {key_predicate}"),
        count: format!("SELECT COUNT(*) FROM {table}"),
    }
}

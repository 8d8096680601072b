//! Schema synthesis: make the backing table exist.
//!
//! Generates `CREATE TABLE` and `CREATE INDEX` statements from an
//! [`EntityDescriptor`] and applies them when the table is absent. A table
//! that already exists is left untouched; drift between its columns and the
//! descriptor is never reconciled.
//!
//! # Table structure
//!
//! - one column per persisted field, in field order, typed by the type
//!   mapper, with `NOT NULL` on key and not-null fields
//! - `PRIMARY KEY (...)` over the key fields in declaration order
//! - at most one secondary index, `idx_{table}`, covering every indexed
//!   field in declaration order

use rusqlite::Connection;
use tracing::{debug, info};

use crate::descriptor::{EntityDescriptor, quote};
use crate::error::Result;

/// Generates the `CREATE TABLE` statement for a descriptor.
///
/// # Examples
///
/// ```
/// use entity_store_core::*;
/// use entity_store_sqlite::{EntityDescriptor, generate_table_sql};
///
/// let schema = EntitySchema::new("Score")
///     .with_field(FieldSchema::new("id", SemanticType::Int).key())
///     .with_field(FieldSchema::new("name", SemanticType::Text).not_null())
///     .with_field(FieldSchema::new("score", SemanticType::Double));
/// let d = EntityDescriptor::build(&schema).unwrap();
///
/// assert_eq!(
///     generate_table_sql(&d),
///     r#"CREATE TABLE "Score" ("id" INT NOT NULL, "name" VARCHAR(256) NOT NULL, "score" REAL, PRIMARY KEY ("id"))"#
/// );
/// ```
pub fn generate_table_sql(descriptor: &EntityDescriptor) -> String {
    let mut defs: Vec<String> = descriptor
        .columns()
        .iter()
        .map(|c| {
            let mut def = format!("{} {}", quote(&c.name), c.mapping.column.as_sql());
            if c.not_null {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect();

    let keys = descriptor
        .key_columns()
        .map(|c| quote(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    defs.push(format!("PRIMARY KEY ({keys})"));

    format!(
        "CREATE TABLE {} ({})",
        quote(descriptor.name()),
        defs.join(", ")
    )
}

/// Generates the `CREATE INDEX` statement, or `None` when no field is indexed.
pub fn generate_index_sql(descriptor: &EntityDescriptor) -> Option<String> {
    let columns: Vec<String> = descriptor
        .indexed_columns()
        .map(|c| quote(&c.name))
        .collect();
    if columns.is_empty() {
        return None;
    }
    Some(format!(
        "CREATE INDEX {} ON {} ({})",
        quote(&format!("idx_{}", descriptor.name())),
        quote(descriptor.name()),
        columns.join(", ")
    ))
}

/// Checks whether a table exists.
///
/// Looks the name up in `sqlite_master` instead of probing the table itself,
/// so a genuine SQL failure surfaces as an error rather than reading as
/// "missing".
pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt = conn.prepare(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1 COLLATE NOCASE",
    )?;
    let count: i64 = stmt.query_row([table], |row| row.get(0))?;
    Ok(count > 0)
}

/// Creates the table and its index if the table is absent.
///
/// Returns `true` if the table was created. Both statements run in one
/// transaction.
pub(crate) fn ensure_table(conn: &mut Connection, descriptor: &EntityDescriptor) -> Result<bool> {
    if table_exists(conn, descriptor.name())? {
        info!(table = descriptor.name(), "table exists");
        return Ok(false);
    }

    info!(table = descriptor.name(), "table does not exist, creating");
    let tx = conn.transaction()?;

    let table_sql = generate_table_sql(descriptor);
    debug!(sql = %table_sql, "create table");
    tx.execute_batch(&table_sql)?;

    if let Some(index_sql) = generate_index_sql(descriptor) {
        debug!(sql = %index_sql, "create index");
        tx.execute_batch(&index_sql)?;
    }

    tx.commit()?;
    Ok(true)
}

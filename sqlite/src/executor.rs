//! Command executor and upsert engine.
//!
//! Binds encoded values into a descriptor's templates and runs them on the
//! shared connection. Statements are prepared through the connection's
//! statement cache, so each template is compiled once per connection.
//!
//! The upsert runs its existence probe and the following insert or update
//! inside one `IMMEDIATE` transaction: the write lock is taken before the
//! probe, so no other writer can slip in between the check and the write.
//!
//! A write that fails inside that transaction is rolled back when the
//! transaction drops. That rollback is only reliable with a journal: with
//! `journal_mode = OFF` (the [`StoreConfig`](entity_store_db::StoreConfig)
//! default for file databases) SQLite leaves the outcome of `ROLLBACK`
//! undefined, so a statement that fails halfway may leave partial changes.
//! Row values are validated before the transaction begins, so encoding
//! failures never reach this point.

use entity_store_core::Value;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Transaction, TransactionBehavior, params_from_iter};
use tracing::debug;

use crate::convert::{encode_keys, encode_row, read_row};
use crate::descriptor::EntityDescriptor;
use crate::error::Result;

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row had the key; a row was inserted.
    Inserted,
    /// A row with the key existed and was overwritten.
    Updated,
}

/// Runs templates against the shared connection.
pub(crate) struct Executor<'c> {
    conn: &'c Connection,
}

impl<'c> Executor<'c> {
    pub(crate) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Runs a query returning a single integer.
    pub(crate) fn scalar(&self, sql: &str, params: &[SqlValue]) -> Result<i64> {
        debug!(sql, params = params.len(), "scalar");
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt.query_row(params_from_iter(params), |row| row.get(0))?)
    }

    /// Runs a statement, returning the number of affected rows.
    pub(crate) fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        debug!(sql, params = params.len(), "execute");
        let mut stmt = self.conn.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(params))?)
    }

    /// Runs a query and decodes every row eagerly, in arrival order.
    pub(crate) fn query(
        &self,
        descriptor: &EntityDescriptor,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<Vec<Value>>> {
        debug!(sql, params = params.len(), "query");
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(read_row(descriptor, row)?);
        }
        Ok(out)
    }

    /// Inserts `values` as a new row, or overwrites the row with the same key.
    pub(crate) fn upsert(
        &self,
        descriptor: &EntityDescriptor,
        values: &[Value],
    ) -> Result<UpsertOutcome> {
        let row = encode_row(descriptor, values)?;
        let keys: Vec<SqlValue> = descriptor
            .key_positions()
            .iter()
            .map(|&i| row[i].clone())
            .collect();
        let templates = descriptor.templates();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let outcome = if self.scalar(&templates.exists, &keys)? > 0 {
            self.execute(&templates.update, &row)?;
            UpsertOutcome::Updated
        } else {
            self.execute(&templates.insert, &row)?;
            UpsertOutcome::Inserted
        };
        tx.commit()?;

        debug!(entity = descriptor.name(), ?outcome, "upsert");
        Ok(outcome)
    }

    /// Deletes the row with the given key, returning the number removed.
    pub(crate) fn delete(&self, descriptor: &EntityDescriptor, keys: &[Value]) -> Result<usize> {
        let keys = encode_keys(descriptor, keys)?;
        self.execute(&descriptor.templates().delete, &keys)
    }

    /// Counts every row of the entity's table.
    pub(crate) fn count(&self, descriptor: &EntityDescriptor) -> Result<usize> {
        let count = self.scalar(&descriptor.templates().count, &[])?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Reads every row, ordered by key.
    pub(crate) fn select_all(&self, descriptor: &EntityDescriptor) -> Result<Vec<Vec<Value>>> {
        self.query(descriptor, &descriptor.templates().select_all, &[])
    }

    /// Reads the row with the given key.
    pub(crate) fn select_one(
        &self,
        descriptor: &EntityDescriptor,
        keys: &[Value],
    ) -> Result<Option<Vec<Value>>> {
        let keys = encode_keys(descriptor, keys)?;
        let mut rows = self.query(descriptor, &descriptor.templates().select_one, &keys)?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}

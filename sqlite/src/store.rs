//! The persistence engine's public surface.
//!
//! [`Store`] owns the single shared connection and the descriptor registry.
//! Entities are registered once through `&mut Store`; afterward every CRUD
//! call goes through `&Store` and only reads the registry.
//!
//! Each operation comes in two forms:
//!
//! - **strict** (`try_add`, `try_get_all`, ...) returns
//!   [`Result`](crate::Result), so "no rows" and "query failed" stay
//!   distinguishable;
//! - **lenient** (`add`, `get_all`, ...) logs any failure as a warning with
//!   the entity name and operation scope, then returns a neutral value
//!   (`None`, `0`, or an empty vector). A failed CRUD call never aborts the
//!   caller.
//!
//! # Example
//!
//! ```
//! use entity_store_core::*;
//! use entity_store_sqlite::{Store, UpsertOutcome};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Score {
//!     id: i32,
//!     name: String,
//!     score: f64,
//! }
//!
//! impl Entity for Score {
//!     const NAME: &'static str = "Score";
//!
//!     fn schema() -> EntitySchema {
//!         EntitySchema::new(Self::NAME)
//!             .with_field(FieldSchema::new("id", SemanticType::Int).key())
//!             .with_field(FieldSchema::new("name", SemanticType::Text))
//!             .with_field(FieldSchema::new("score", SemanticType::Double))
//!     }
//!
//!     fn value(&self, field: &str) -> Value {
//!         match field {
//!             "id" => self.id.into(),
//!             "name" => self.name.as_str().into(),
//!             "score" => self.score.into(),
//!             _ => Value::Null,
//!         }
//!     }
//!
//!     fn set_value(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
//!         match field {
//!             "id" => self.id = value.try_into()?,
//!             "name" => self.name = value.try_into()?,
//!             "score" => self.score = value.try_into()?,
//!             _ => {}
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut store = Store::in_memory().unwrap();
//! store.register::<Score>().unwrap();
//!
//! let a = Score { id: 1, name: "a".into(), score: 1.5 };
//! assert_eq!(store.add(&a), Some(UpsertOutcome::Inserted));
//!
//! let b = Score { id: 1, name: "b".into(), score: 2.5 };
//! assert_eq!(store.add(&b), Some(UpsertOutcome::Updated));
//! assert_eq!(store.get_all::<Score>(), vec![b.clone()]);
//!
//! store.delete(&b);
//! assert_eq!(store.count::<Score>(), 0);
//! ```

use entity_store_core::{Entity, EntitySchema, Value};
use entity_store_db::StoreConfig;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::connection::open_connection;
use crate::convert::{materialize, record_keys, record_values};
use crate::descriptor::EntityDescriptor;
use crate::error::{Result, StoreError};
use crate::executor::{Executor, UpsertOutcome};
use crate::registry::Registry;
use crate::schema::ensure_table;

/// Single-connection entity store.
pub struct Store {
    conn: Connection,
    registry: Registry,
}

impl Store {
    /// Wraps an already open connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            registry: Registry::new(),
        }
    }

    /// Opens (or creates) the database described by `config`.
    ///
    /// # Errors
    ///
    /// See [`open_connection`].
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(open_connection(config)?))
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Registers a record type, creating its table if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NameMismatch`] if `T::schema()` is not named
    /// `T::NAME`, plus everything [`register_schema`](Self::register_schema)
    /// can return.
    pub fn register<T: Entity>(&mut self) -> Result<()> {
        let schema = T::schema();
        if schema.name != T::NAME {
            return Err(StoreError::NameMismatch {
                declared: T::NAME.to_string(),
                schema: schema.name,
            });
        }
        self.register_schema(&schema).map(|_| ())
    }

    /// Registers an entity description, creating its table if absent.
    ///
    /// Validation runs first, then the duplicate check, then schema
    /// synthesis; a rejected description leaves the database untouched.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidSchema`] for a missing key, an unsupported
    ///   type, or any other validation failure
    /// - [`StoreError::DuplicateEntity`] if the name is already registered
    /// - [`StoreError::DatabaseError`] if the table cannot be probed or created
    pub fn register_schema(&mut self, schema: &EntitySchema) -> Result<&EntityDescriptor> {
        let descriptor = EntityDescriptor::build(schema)?;
        if self.registry.contains(descriptor.name()) {
            return Err(StoreError::DuplicateEntity(descriptor.name().to_string()));
        }
        let created = ensure_table(&mut self.conn, &descriptor)?;
        info!(
            entity = descriptor.name(),
            columns = descriptor.columns().len(),
            created,
            "entity registered"
        );
        self.registry.insert(descriptor)
    }

    /// The descriptor registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Looks up a registered entity's descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEntity`] if it was never registered.
    pub fn descriptor(&self, entity: &str) -> Result<&EntityDescriptor> {
        self.registry.get(entity)
    }

    /// The shared connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(&self.conn)
    }

    // -----------------------------------------------------------------------
    // Strict, by entity name
    // -----------------------------------------------------------------------

    /// Upserts a row given one value per persisted column, in column order.
    pub fn try_upsert_values(&self, entity: &str, values: &[Value]) -> Result<UpsertOutcome> {
        let descriptor = self.registry.get(entity)?;
        self.executor().upsert(descriptor, values)
    }

    /// Deletes the row with the given key tuple.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyCountMismatch`] if `keys` does not have one
    /// value per key column.
    pub fn try_delete_keys(&self, entity: &str, keys: &[Value]) -> Result<usize> {
        let descriptor = self.registry.get(entity)?;
        self.executor().delete(descriptor, keys)
    }

    /// Counts the rows of an entity's table.
    pub fn try_count_rows(&self, entity: &str) -> Result<usize> {
        let descriptor = self.registry.get(entity)?;
        self.executor().count(descriptor)
    }

    /// Reads every row as values in column order, ordered by key.
    pub fn try_select_all(&self, entity: &str) -> Result<Vec<Vec<Value>>> {
        let descriptor = self.registry.get(entity)?;
        self.executor().select_all(descriptor)
    }

    /// Reads the row with the given key tuple.
    pub fn try_select(&self, entity: &str, keys: &[Value]) -> Result<Option<Vec<Value>>> {
        let descriptor = self.registry.get(entity)?;
        self.executor().select_one(descriptor, keys)
    }

    // -----------------------------------------------------------------------
    // Strict, typed
    // -----------------------------------------------------------------------

    /// Inserts `record`, or overwrites the stored row with the same key.
    pub fn try_add<T: Entity>(&self, record: &T) -> Result<UpsertOutcome> {
        let descriptor = self.registry.get(T::NAME)?;
        self.executor()
            .upsert(descriptor, &record_values(descriptor, record))
    }

    /// Deletes the stored row with `record`'s key.
    pub fn try_delete<T: Entity>(&self, record: &T) -> Result<usize> {
        let descriptor = self.registry.get(T::NAME)?;
        self.executor()
            .delete(descriptor, &record_keys(descriptor, record))
    }

    /// Deletes the stored row with the given key tuple.
    pub fn try_delete_by_keys<T: Entity>(&self, keys: &[Value]) -> Result<usize> {
        self.try_delete_keys(T::NAME, keys)
    }

    /// Counts stored records of `T`.
    pub fn try_count<T: Entity>(&self) -> Result<usize> {
        self.try_count_rows(T::NAME)
    }

    /// Reads every stored record of `T`, ordered by key.
    pub fn try_get_all<T: Entity>(&self) -> Result<Vec<T>> {
        let descriptor = self.registry.get(T::NAME)?;
        self.executor()
            .select_all(descriptor)?
            .into_iter()
            .map(|row| materialize(descriptor, row))
            .collect()
    }

    /// Reads the stored record of `T` with the given key tuple.
    pub fn try_get<T: Entity>(&self, keys: &[Value]) -> Result<Option<T>> {
        let descriptor = self.registry.get(T::NAME)?;
        self.executor()
            .select_one(descriptor, keys)?
            .map(|row| materialize(descriptor, row))
            .transpose()
    }

    // -----------------------------------------------------------------------
    // Lenient, typed
    // -----------------------------------------------------------------------

    /// Inserts or updates `record`; `None` if the operation failed.
    pub fn add<T: Entity>(&self, record: &T) -> Option<UpsertOutcome> {
        logged(T::NAME, "add", self.try_add(record))
    }

    /// Same as [`add`](Self::add); the engine only observes existence.
    pub fn update<T: Entity>(&self, record: &T) -> Option<UpsertOutcome> {
        self.add(record)
    }

    /// Same as [`add`](Self::add); the engine only observes existence.
    pub fn insert<T: Entity>(&self, record: &T) -> Option<UpsertOutcome> {
        self.add(record)
    }

    /// Deletes `record`'s row; returns the number of rows removed.
    pub fn delete<T: Entity>(&self, record: &T) -> usize {
        logged(T::NAME, "delete", self.try_delete(record)).unwrap_or_default()
    }

    /// Deletes the row with the given key tuple; returns the number removed.
    pub fn delete_by_keys<T: Entity>(&self, keys: &[Value]) -> usize {
        logged(T::NAME, "delete", self.try_delete_by_keys::<T>(keys)).unwrap_or_default()
    }

    /// Counts stored records of `T`; `0` on failure.
    pub fn count<T: Entity>(&self) -> usize {
        logged(T::NAME, "count", self.try_count::<T>()).unwrap_or_default()
    }

    /// Reads every stored record of `T`; empty on failure.
    pub fn get_all<T: Entity>(&self) -> Vec<T> {
        logged(T::NAME, "get_all", self.try_get_all()).unwrap_or_default()
    }

    /// Reads the record with the given key tuple; `None` if absent or on failure.
    pub fn get<T: Entity>(&self, keys: &[Value]) -> Option<T> {
        logged(T::NAME, "get", self.try_get(keys)).flatten()
    }
}

/// Reports a failed operation and downgrades it to `None`.
fn logged<R>(entity: &str, scope: &'static str, result: Result<R>) -> Option<R> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(entity, scope, error = %err, "error in {scope} for {entity}");
            None
        }
    }
}

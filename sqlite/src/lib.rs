//! SQLite persistence engine for described record types.
//!
//! A record type is described once (see
//! [`Entity`](entity_store_core::Entity) and
//! [`EntitySchema`](entity_store_core::EntitySchema)) and registered with a
//! [`Store`]. Registration validates the description, creates the backing
//! table and index if they are missing, and caches an [`EntityDescriptor`]
//! holding pre-built statement templates. CRUD calls afterward bind record
//! values into those templates on the single shared connection.
//!
//! # Architecture
//!
//! - **`connection`**: opens or creates the database file from a
//!   [`StoreConfig`](entity_store_db::StoreConfig)
//! - **`descriptor`**: persisted columns and statement templates
//! - **`schema`**: `CREATE TABLE` / `CREATE INDEX` synthesis
//! - **`registry`**: entity name to descriptor, written once per entity
//! - **`convert`**: value encoding, column decoding, row materialization
//! - **`executor`**: template execution and the insert-or-update upsert
//! - **`store`**: strict (`try_*`) and lenient CRUD surface
//!
//! # Quick start
//!
//! ```no_run
//! use entity_store_db::StoreConfig;
//! use entity_store_sqlite::Store;
//!
//! let config = StoreConfig::load("store.yml").unwrap();
//! let mut store = Store::open(&config).unwrap();
//! // store.register::<MyRecord>().unwrap();
//! ```
//!
//! # Concurrency
//!
//! The store owns one [`rusqlite::Connection`] and is used synchronously;
//! every call blocks for its database round trip. Wrap it in a mutex to share
//! it between threads. The upsert's existence probe and write run in one
//! immediate transaction, so concurrent writers cannot both observe a key as
//! absent.

mod connection;
mod convert;
mod descriptor;
mod error;
mod executor;
mod registry;
mod schema;
mod store;

pub use connection::open_connection;
pub use descriptor::{ColumnDescriptor, EntityDescriptor, Templates};
pub use error::{Result, StoreError};
pub use executor::UpsertOutcome;
pub use registry::Registry;
pub use schema::{generate_index_sql, generate_table_sql};
pub use store::Store;

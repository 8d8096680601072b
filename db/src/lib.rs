//! Configuration and table description loading for the entity store.
//!
//! - [`StoreConfig`]: where the database file lives, whether to create it,
//!   and which journal mode to use. Loaded from YAML.
//! - [`TableSpec`]: a YAML description of one table, converted into an
//!   [`EntitySchema`](entity_store_core::EntitySchema).
//! - [`TableCatalog`]: every table description found in a directory.
//!
//! # Quick start
//!
//! ```no_run
//! use entity_store_db::{StoreConfig, TableCatalog};
//!
//! let config = StoreConfig::load("store.yml").unwrap();
//! if let Some(dir) = &config.tables {
//!     let catalog = TableCatalog::from_dir(dir).unwrap();
//!     for name in catalog.tables() {
//!         println!("{name}");
//!     }
//! }
//! ```

mod catalog;
mod config;
mod error;

pub use catalog::{FieldSpec, TableCatalog, TableSpec};
pub use config::{JournalMode, StoreConfig};
pub use error::{DatabaseError, Result};

//! Opening the single shared connection.

use entity_store_db::StoreConfig;
use rusqlite::{Connection, OpenFlags};
use tracing::info;

use crate::error::{Result, StoreError};

/// Opens the database file described by `config`.
///
/// An existing file is opened read/write. A missing file is created, along
/// with its parent directory, when `create_if_missing` is set; a fresh file
/// gets UTF-8 text encoding. The configured journal mode is applied either
/// way.
///
/// # Errors
///
/// Returns [`StoreError::DatabaseMissing`] if the file is absent and creation
/// is disabled, [`StoreError::IoError`] if the directory cannot be created,
/// or [`StoreError::DatabaseError`] if SQLite refuses to open the file.
pub fn open_connection(config: &StoreConfig) -> Result<Connection> {
    let path = config.path.as_path();
    let exists = path.exists();

    if !exists {
        if !config.create_if_missing {
            return Err(StoreError::DatabaseMissing(path.to_path_buf()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if !exists {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }
    let conn = Connection::open_with_flags(path, flags)?;

    if !exists {
        conn.pragma_update(None, "encoding", "UTF-8")?;
    }
    let journal: String = conn.pragma_update_and_check(
        None,
        "journal_mode",
        config.journal_mode.as_pragma(),
        |row| row.get(0),
    )?;

    info!(
        path = %path.display(),
        created = !exists,
        journal = %journal,
        "database connection open"
    );
    Ok(conn)
}

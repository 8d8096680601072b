//! Store configuration.
//!
//! Controls where the single database file lives and how it is opened.
//!
//! # Example YAML
//!
//! ```yaml
//! path: Database/BotDb.db
//! create_if_missing: true
//! journal_mode: off
//! tables: tables/
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! containing the configuration file.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, Result};

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "Database/BotDb.db";

/// SQLite journal mode applied when the connection is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// No rollback journal.
    #[default]
    Off,
    /// Rollback journal deleted after each transaction.
    Delete,
    /// Write-ahead log.
    Wal,
    /// Rollback journal kept in memory.
    Memory,
}

impl JournalMode {
    /// Value for `PRAGMA journal_mode`.
    pub const fn as_pragma(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Delete => "DELETE",
            Self::Wal => "WAL",
            Self::Memory => "MEMORY",
        }
    }
}

/// Configuration for opening the store.
///
/// # Examples
///
/// ```
/// use entity_store_db::{JournalMode, StoreConfig};
///
/// let config: StoreConfig = serde_yaml::from_str("path: bot.db").unwrap();
/// assert!(config.create_if_missing);
/// assert_eq!(config.journal_mode, JournalMode::Off);
/// assert!(config.tables.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file path.
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Create the file (and its directory) when it does not exist.
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
    /// Journal mode applied on open.
    #[serde(default)]
    pub journal_mode: JournalMode,
    /// Directory of table description files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<PathBuf>,
}

fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

const fn default_create_if_missing() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            create_if_missing: default_create_if_missing(),
            journal_mode: JournalMode::default(),
            tables: None,
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for the given database file with defaults
    /// for everything else.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// Relative `path` and `tables` entries are resolved against the
    /// directory containing `path`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// read, [`YamlError`](DatabaseError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](DatabaseError::InvalidConfig) if the database path
    /// is empty.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;

        if config.path.as_os_str().is_empty() {
            return Err(DatabaseError::InvalidConfig(format!(
                "{}: database path cannot be empty",
                path.display()
            )));
        }

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](DatabaseError::IoError) if the file cannot be
    /// written, or [`YamlError`](DatabaseError::YamlError) if serialization
    /// fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        if self.path.is_relative() {
            self.path = base.join(&self.path);
        }
        if let Some(tables) = &self.tables {
            if tables.is_relative() {
                self.tables = Some(base.join(tables));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complete() {
        let yaml = r#"
path: data/store.db
create_if_missing: false
journal_mode: wal
tables: tables
"#;
        let config: StoreConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.path, PathBuf::from("data/store.db"));
        assert!(!config.create_if_missing);
        assert_eq!(config.journal_mode, JournalMode::Wal);
        assert_eq!(config.tables, Some(PathBuf::from("tables")));
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: StoreConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.path, PathBuf::from(DEFAULT_DATABASE_PATH));
    }

    #[test]
    fn test_journal_mode_pragma() {
        assert_eq!(JournalMode::Off.as_pragma(), "OFF");
        assert_eq!(JournalMode::Wal.as_pragma(), "WAL");
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yml");
        std::fs::write(&path, "path: bot.db\ntables: tables\n").unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.path, dir.path().join("bot.db"));
        assert_eq!(config.tables, Some(dir.path().join("tables")));
    }

    #[test]
    fn test_load_rejects_empty_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yml");
        std::fs::write(&path, "path: \"\"\n").unwrap();

        let err = StoreConfig::load(&path).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yml");

        let mut original = StoreConfig::with_path(dir.path().join("x.db"));
        original.journal_mode = JournalMode::Memory;
        original.save(&path).unwrap();

        let loaded = StoreConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}

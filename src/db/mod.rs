//! SQLite database driver and migration runner.
//!
//! Both consume the resolved configuration; neither is involved in resolving it.

pub mod migrations;

use crate::config::DatabaseSettings;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

pub use migrations::{migrate, Migration, SAMPLE_MIGRATIONS};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Failed to open database {}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to create database directory {}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Migration {version} ({name}) failed")]
    Migration {
        version: i64,
        name: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Migrations out of order: {version} ({name}) must be newer than {previous}")]
    OutOfOrder { version: i64, name: String, previous: i64 },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Open the configured database with foreign keys enforced.
pub fn connect(settings: &DatabaseSettings) -> Result<Connection, DbError> {
    let conn = if settings.is_in_memory() {
        Connection::open_in_memory()
    } else {
        if let Some(parent) = settings.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| DbError::Directory { path: parent.to_path_buf(), source })?;
        }
        Connection::open(&settings.path)
    }
    .map_err(|source| DbError::Connection { path: settings.path.clone(), source })?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    tracing::debug!(
        "Connected to {} (pool_size {})",
        settings.path.display(),
        settings.pool_size
    );
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(path: PathBuf) -> DatabaseSettings {
        DatabaseSettings { path, pool_size: 1, stacktrace: false }
    }

    #[test]
    fn connect_creates_parent_directories() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("priv").join("sample.db");

        let conn = connect(&settings(path.clone())).expect("connect");
        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).expect("pragma");

        assert_eq!(fk, 1);
        assert!(path.exists());
    }

    #[test]
    fn connect_in_memory() {
        let conn = connect(&settings(PathBuf::from(":memory:"))).expect("connect");
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0)).expect("query");
        assert_eq!(one, 1);
    }
}

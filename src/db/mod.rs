//! Database module - SQLite with WAL mode for crash-safe persistence.
//!
//! This module provides database connection management and the user and
//! task operations the domain services are built on.

mod schema;
mod ops;

pub use ops::*;

use rusqlite::Connection;
use std::path::Path;

use crate::{TaskManagerError, Result};

/// Database wrapper providing connection management.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Open a database connection with WAL mode and the schema in place.
///
/// This function:
/// 1. Creates parent directory if it doesn't exist
/// 2. Opens connection with rusqlite
/// 3. Configures WAL mode for crash safety
/// 4. Initializes schema (creates tables if needed)
pub fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path).map_err(|e| TaskManagerError::Database(e.to_string()))?;

    // Configure WAL mode - persists to the database file
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| TaskManagerError::Database(format!("Failed to set journal_mode: {}", e)))?;

    // NORMAL synchronous is safe in WAL mode, faster than FULL
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| TaskManagerError::Database(format!("Failed to set synchronous: {}", e)))?;

    // 5 second busy timeout for concurrent access
    conn.pragma_update(None, "busy_timeout", 5000i32)
        .map_err(|e| TaskManagerError::Database(format!("Failed to set busy_timeout: {}", e)))?;

    schema::init(&conn)?;

    Ok(Database { conn })
}

/// Open a private in-memory database with the schema in place.
pub fn open_in_memory() -> Result<Database> {
    let conn = Connection::open_in_memory().map_err(|e| TaskManagerError::Database(e.to_string()))?;
    schema::init(&conn)?;
    Ok(Database { conn })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_database_creates_parent_dir() {
        let temp_dir = std::env::temp_dir().join("taskmanager_test_db");
        let db_path = temp_dir.join("subdir").join("test.db");

        let _ = fs::remove_dir_all(&temp_dir);

        let result = open_database(&db_path);
        assert!(result.is_ok());
        assert!(db_path.exists());

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_wal_mode_enabled() {
        let temp_dir = std::env::temp_dir().join("taskmanager_test_wal");
        let db_path = temp_dir.join("test.db");

        let _ = fs::remove_dir_all(&temp_dir);

        let db = open_database(&db_path).unwrap();

        let journal_mode: String = db
            .conn()
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");

        drop(db);
        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_open_in_memory_has_schema() {
        let db = open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}

//! Database schema module - table definitions.
//!
//! This module contains the SQL schema for the task manager database:
//! users, tasks and the association table between them.

use rusqlite::Connection;
use crate::{TaskManagerError, Result};

/// Initialize the database schema.
///
/// Creates the tables and indexes if they don't already exist. This is
/// called on every database open.
///
/// # Schema
///
/// ## users table
/// - `id`: Primary key
/// - `first_name`, `last_name`: Display names
/// - `email`: Contact address for notifications
/// - `age`: Age in years
///
/// ## tasks table
/// - `id`: Primary key
/// - `title`, `description`: Task text
/// - `status`: Literal status name ("OPENED", "INPROGRESS", "COMPLETED")
/// - `due_date`: ISO-8601 date text, NULL when the task has no deadline
///
/// ## task_users table
/// - `task_id`, `user_id`: Assignment of users to tasks, removed together
///   with either side
///
/// ISO date text sorts chronologically, so date comparisons push down as
/// plain text comparisons. This holds for four-digit years only; task
/// validation rejects due dates outside 0000-9999.
pub fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            age INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL,
            due_date TEXT
        );

        CREATE TABLE IF NOT EXISTS task_users (
            task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (task_id, user_id)
        );

        -- Index for reverse lookups (tasks of a user)
        CREATE INDEX IF NOT EXISTS idx_task_users_user ON task_users(user_id);

        -- Index for expiry scans
        CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
        "#,
    )
    .map_err(|e| TaskManagerError::Database(format!("Failed to initialize schema: {}", e)))?;

    Ok(())
}

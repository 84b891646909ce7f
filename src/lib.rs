//! Task manager backend - users, tasks and the attribute filter language.
//!
//! This library provides the core functionality for the task manager service,
//! including database management, the search filter engine, domain services
//! and the wire protocol used by the command line client.

pub mod db;
pub mod ipc;
pub mod model;
pub mod search;
pub mod service;

use thiserror::Error;

/// Task manager error types covering all failure modes.
#[derive(Error, Debug)]
pub enum TaskManagerError {
    /// Search clause names a field the entity does not have
    #[error("Unknown attribute: {field}")]
    UnknownAttribute { field: String },

    /// Search value could not be converted into the attribute's type
    #[error("Cannot convert '{value}' for attribute {field}: expected {expected}")]
    TypeCoercion {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// Relational operator applied to an attribute without an ordering
    #[error("Operator '{operator}' is not supported for attribute {field}")]
    UnsupportedOperator { field: String, operator: &'static str },

    /// Grammar engine failure while reading a search string
    #[error("Query error: {0}")]
    Query(String),

    /// Input rejected by field validation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Requested resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// User is already assigned to the task
    #[error("User {user_id} already exists in task {task_id}")]
    UserAlreadyInTask { user_id: i64, task_id: i64 },

    /// Database errors (SQLite operations)
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration file errors
    #[error("Config error: {0}")]
    Config(String),

    /// Client/server protocol errors
    #[error("IPC error: {0}")]
    Ipc(String),

    /// I/O errors (file/network operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classes reported to protocol clients.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Internal,
}

impl TaskManagerError {
    /// Classify the error for clients.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskManagerError::NotFound(_) => ErrorKind::NotFound,
            TaskManagerError::UnknownAttribute { .. }
            | TaskManagerError::TypeCoercion { .. }
            | TaskManagerError::UnsupportedOperator { .. }
            | TaskManagerError::Query(_)
            | TaskManagerError::Validation(_)
            | TaskManagerError::UserAlreadyInTask { .. } => ErrorKind::BadRequest,
            TaskManagerError::Database(_)
            | TaskManagerError::Config(_)
            | TaskManagerError::Ipc(_)
            | TaskManagerError::Io(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias using TaskManagerError
pub type Result<T> = std::result::Result<T, TaskManagerError>;

//! Protocol types for task manager requests and responses.
//!
//! Uses length-prefixed JSON messages for reliable framing over TCP.
//! Format: 4-byte little-endian length prefix followed by JSON bytes.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::model::{Status, Task, TaskDraft, TaskQuery, User, UserDraft};
use crate::{ErrorKind, Result, TaskManagerError};

/// Largest accepted message body.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Request from a client to the service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// List users, optionally narrowed by a search string
    ListUsers { search: Option<String> },
    GetUser { id: i64 },
    CreateUser { user: UserDraft },
    UpdateUser { id: i64, user: UserDraft },
    DeleteUser { id: i64 },
    /// List tasks by title, status, assigned user and due date
    ListTasks {
        #[serde(default)]
        query: TaskQuery,
    },
    /// List tasks matching a search string
    SearchTasks { search: Option<String> },
    GetTask { id: i64 },
    CreateTask { task: TaskDraft },
    DeleteTask { id: i64 },
    AddUserToTask { task_id: i64, user_id: i64 },
    RemoveUserFromTask { task_id: i64, user_id: i64 },
    ChangeTaskStatus { task_id: i64, status: Status },
    /// Tasks whose due date has passed
    ExpiredTasks,
}

/// Response from the service to a client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Users { users: Vec<User> },
    User { user: User },
    Tasks { tasks: Vec<Task> },
    Task { task: Task },
    Deleted { message: String },
    Error { kind: ErrorKind, message: String },
}

/// Read a length-prefixed JSON message, or `None` on a clean end of stream.
///
/// Message format:
/// - 4 bytes: little-endian u32 message length
/// - N bytes: JSON-encoded message
pub async fn try_read_message<T, R>(reader: &mut R) -> Result<Option<T>>
where
    T: for<'de> Deserialize<'de>,
    R: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => {
            return Err(TaskManagerError::Ipc(format!(
                "Failed to read message length: {}",
                e
            )))
        }
    }

    let len = u32::from_le_bytes(len_buf) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(TaskManagerError::Ipc(format!(
            "Message too large: {} bytes (max {})",
            len, MAX_MESSAGE_SIZE
        )));
    }

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| TaskManagerError::Ipc(format!("Failed to read message body: {}", e)))?;

    serde_json::from_slice(&buf)
        .map(Some)
        .map_err(|e| TaskManagerError::Ipc(format!("Failed to parse message: {}", e)))
}

/// Read a length-prefixed JSON message.
///
/// # Errors
/// Returns error if the stream ends, read fails, message is too large, or
/// JSON parsing fails.
pub async fn read_message<T, R>(reader: &mut R) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    R: AsyncReadExt + Unpin,
{
    try_read_message(reader)
        .await?
        .ok_or_else(|| TaskManagerError::Ipc("Connection closed before message".to_string()))
}

/// Write a length-prefixed JSON message.
///
/// # Errors
/// Returns error if serialization or write fails.
pub async fn write_message<T, W>(writer: &mut W, message: &T) -> Result<()>
where
    T: Serialize,
    W: AsyncWriteExt + Unpin,
{
    let json = serde_json::to_vec(message)
        .map_err(|e| TaskManagerError::Ipc(format!("Failed to serialize message: {}", e)))?;

    if json.len() > MAX_MESSAGE_SIZE {
        return Err(TaskManagerError::Ipc(format!(
            "Message too large: {} bytes (max {})",
            json.len(),
            MAX_MESSAGE_SIZE
        )));
    }

    let len = json.len() as u32;
    writer
        .write_all(&len.to_le_bytes())
        .await
        .map_err(|e| TaskManagerError::Ipc(format!("Failed to write message length: {}", e)))?;

    writer
        .write_all(&json)
        .await
        .map_err(|e| TaskManagerError::Ipc(format!("Failed to write message body: {}", e)))?;

    writer
        .flush()
        .await
        .map_err(|e| TaskManagerError::Ipc(format!("Failed to flush message: {}", e)))?;

    Ok(())
}

//! TCP client for the task manager service.
//!
//! The client is stateless - it connects per request.

use tokio::net::TcpStream;

use crate::ipc::protocol::{read_message, write_message, Request, Response};
use crate::model::User;
use crate::{TaskManagerError, Result};

/// Client sending requests to the task manager service.
///
/// A new connection is opened for each request, which avoids connection
/// state management.
pub struct IpcClient {
    addr: String,
}

impl IpcClient {
    /// Create a client for the service at `addr` (`host:port`).
    ///
    /// No connection is made until a request is sent.
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Send one request and wait for its response.
    ///
    /// # Errors
    /// Returns error if connection fails or communication error occurs.
    /// Service-side failures arrive as `Response::Error`.
    pub async fn send(&self, request: &Request) -> Result<Response> {
        let mut stream = TcpStream::connect(&self.addr).await.map_err(|e| {
            TaskManagerError::Ipc(format!(
                "Failed to connect to task manager at {}: {}. Is the service running?",
                self.addr, e
            ))
        })?;

        write_message(&mut stream, request).await?;
        read_message(&mut stream).await
    }

    /// List users matching an optional search string.
    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<User>> {
        let request = Request::ListUsers {
            search: search.map(str::to_string),
        };

        match self.send(&request).await? {
            Response::Users { users } => Ok(users),
            Response::Error { message, .. } => Err(TaskManagerError::Ipc(message)),
            other => Err(TaskManagerError::Ipc(format!("Unexpected response: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let client = IpcClient::new(addr);
        let result = client.send(&Request::ExpiredTasks).await;
        assert!(matches!(result, Err(TaskManagerError::Ipc(msg)) if msg.contains("Is the service running")));
    }
}

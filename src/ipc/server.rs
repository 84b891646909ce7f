//! TCP server for the task manager service.
//!
//! Accepts client connections until shutdown and answers each framed
//! request from the shared database.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::db::Database;
use crate::ipc::handler::handle_request;
use crate::ipc::protocol::{try_read_message, write_message, Request};
use crate::service::notify::{Mailer, Notifier};
use crate::{TaskManagerError, Result};

/// Request server sharing one database connection between clients.
#[derive(Clone)]
pub struct IpcServer {
    db: Arc<Mutex<Database>>,
    mailer: Arc<Mailer>,
    notifier: Arc<dyn Notifier>,
}

impl IpcServer {
    /// Create a new server.
    ///
    /// # Arguments
    /// * `db` - Shared database connection (thread-safe)
    /// * `mailer` - Renders assignment notifications
    /// * `notifier` - Receives rendered notifications
    pub fn new(db: Arc<Mutex<Database>>, mailer: Mailer, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            mailer: Arc::new(mailer),
            notifier,
        }
    }

    /// Bind a listener on `addr`.
    pub async fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|e| TaskManagerError::Ipc(format!("Failed to bind {}: {}", addr, e)))
    }

    /// Run the server, accepting client connections until shutdown.
    ///
    /// Individual client errors are logged but don't stop the server.
    pub async fn run(&self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        match listener.local_addr() {
            Ok(addr) => tracing::info!("Starting request server on {}", addr),
            Err(e) => tracing::warn!("Starting request server on unknown address: {}", e),
        }

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Request server shutting down");
                    return Ok(());
                }
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            tracing::debug!("Client connected from {}", peer);
                            let server = self.clone();
                            tokio::spawn(async move {
                                if let Err(e) = server.handle_client(stream).await {
                                    tracing::warn!("Client handler error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::warn!("Failed to accept client connection: {}", e);
                        }
                    }
                }
            }
        }
    }

    /// Serve requests from one client until it disconnects.
    async fn handle_client(&self, mut stream: TcpStream) -> Result<()> {
        while let Some(request) = try_read_message::<Request, _>(&mut stream).await? {
            tracing::debug!("Request: {:?}", request);
            let start = Instant::now();

            let response = {
                let db = self.db.lock().map_err(|e| {
                    TaskManagerError::Ipc(format!("Failed to acquire database lock: {}", e))
                })?;
                handle_request(&db, &self.mailer, self.notifier.as_ref(), request)
            };

            tracing::debug!("Request handled in {}ms", start.elapsed().as_millis());

            write_message(&mut stream, &response).await?;
        }

        tracing::debug!("Client disconnected");
        Ok(())
    }
}

//! Service lifecycle and domain services.
//!
//! This module handles:
//! - Configuration loading
//! - Database initialization
//! - User and task operations with validation and notifications
//! - Running the request server until shutdown

pub mod config;
pub mod notify;
pub mod tasks;
pub mod users;
pub mod validator;

pub use config::ServiceConfig;
pub use notify::{Email, LogNotifier, Mailer, MemoryNotifier, Notifier};
pub use tasks::TaskService;
pub use users::UserService;

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::db;
use crate::ipc::IpcServer;
use crate::Result;

/// Run the task manager service.
///
/// This function implements the full service lifecycle:
/// 1. Ensure the data directory exists
/// 2. Open the database
/// 3. Bind the request server
/// 4. Serve requests until the shutdown signal
pub async fn run_service(config: ServiceConfig, shutdown: broadcast::Receiver<()>) -> Result<()> {
    tracing::info!("Loaded configuration: data_dir={:?}", config.data_dir);

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        return Err(e.into());
    }

    let db_path = config.database_path();
    let database = db::open_database(&db_path)?;
    tracing::info!("Database opened: {:?}", db_path);

    let server = IpcServer::new(
        Arc::new(Mutex::new(database)),
        Mailer::new(config.mail_sender.clone()),
        Arc::new(LogNotifier),
    );

    let listener = IpcServer::bind(&config.listen_addr).await?;
    server.run(listener, shutdown).await?;

    tracing::info!("Service stopped successfully");
    Ok(())
}

//! IPC module for communication between clients and the task manager service.
//!
//! The service runs a TCP server speaking length-prefixed JSON; the command
//! line tool connects as a client.

pub mod client;
pub mod handler;
pub mod protocol;
pub mod server;

pub use client::IpcClient;
pub use handler::handle_request;
pub use protocol::*;
pub use server::IpcServer;

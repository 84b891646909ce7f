//! Task manager command line client.
//!
//! Sends one request to a running service and prints the JSON response.
//!
//! ```text
//! taskmanager-cli users --search "firstName:John,age>=20"
//! taskmanager-cli tasks --status OPENED --before 2024-01-01
//! taskmanager-cli search-tasks "dueDate<20240101"
//! ```

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskmanager::ipc::{IpcClient, Request, Response};
use taskmanager::model::{Status, TaskQuery};

#[derive(Parser)]
#[command(name = "taskmanager-cli", about = "Query the task manager service")]
struct Cli {
    /// Service address
    #[arg(long, env = "TASKMANAGER_ADDR", default_value = "127.0.0.1:7878")]
    addr: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List users, optionally filtered by a search string
    Users {
        #[arg(long, help = "Search clauses, e.g. firstName:John,age>=20")]
        search: Option<String>,
    },
    /// Show one user
    User { id: i64 },
    /// List tasks by title, status, assigned user and due date
    Tasks {
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<Status>,
        #[arg(long)]
        user: Option<i64>,
        #[arg(long, help = "Due strictly before this date (YYYY-MM-DD)")]
        before: Option<NaiveDate>,
    },
    /// List tasks matching a search string
    SearchTasks { search: String },
    /// Show one task
    Task { id: i64 },
    /// List tasks whose due date has passed
    Expired,
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.parse::<Status>().map_err(|e| e.to_string())
}

impl Command {
    fn into_request(self) -> Request {
        match self {
            Command::Users { search } => Request::ListUsers { search },
            Command::User { id } => Request::GetUser { id },
            Command::Tasks {
                title,
                status,
                user,
                before,
            } => Request::ListTasks {
                query: TaskQuery {
                    title,
                    status,
                    user_id: user,
                    date_before: before,
                },
            },
            Command::SearchTasks { search } => Request::SearchTasks {
                search: Some(search),
            },
            Command::Task { id } => Request::GetTask { id },
            Command::Expired => Request::ExpiredTasks,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = IpcClient::new(cli.addr);
    let request = cli.command.into_request();
    tracing::debug!("Sending {:?}", request);

    let response = match client.send(&request).await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: failed to render response: {}", e);
            return ExitCode::from(2);
        }
    }

    if matches!(response, Response::Error { .. }) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

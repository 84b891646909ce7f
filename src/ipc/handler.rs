//! Request dispatch onto the domain services.

use crate::db::Database;
use crate::ipc::protocol::{Request, Response};
use crate::service::notify::{Mailer, Notifier};
use crate::service::tasks::TaskService;
use crate::service::users::UserService;
use crate::Result;

/// Execute one request against the database.
///
/// Failures become `Response::Error` carrying the error class and message;
/// nothing is partially applied for a failed search.
pub fn handle_request(
    db: &Database,
    mailer: &Mailer,
    notifier: &dyn Notifier,
    request: Request,
) -> Response {
    match execute(db, mailer, notifier, request) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Request failed: {}", e);
            Response::Error {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    }
}

fn execute(db: &Database, mailer: &Mailer, notifier: &dyn Notifier, request: Request) -> Result<Response> {
    let users = UserService::new(db.conn());
    let tasks = TaskService::new(db.conn(), mailer, notifier);

    let response = match request {
        Request::ListUsers { search } => Response::Users {
            users: users.list(search.as_deref())?,
        },
        Request::GetUser { id } => Response::User { user: users.get(id)? },
        Request::CreateUser { user } => Response::User {
            user: users.create(&user)?,
        },
        Request::UpdateUser { id, user } => Response::User {
            user: users.update(id, &user)?,
        },
        Request::DeleteUser { id } => {
            users.delete(id)?;
            Response::Deleted {
                message: "User deleted".to_string(),
            }
        }
        Request::ListTasks { query } => Response::Tasks {
            tasks: tasks.list(&query)?,
        },
        Request::SearchTasks { search } => Response::Tasks {
            tasks: tasks.search(search.as_deref())?,
        },
        Request::GetTask { id } => Response::Task { task: tasks.get(id)? },
        Request::CreateTask { task } => Response::Task {
            task: tasks.create(&task)?,
        },
        Request::DeleteTask { id } => {
            tasks.delete(id)?;
            Response::Deleted {
                message: "Task deleted".to_string(),
            }
        }
        Request::AddUserToTask { task_id, user_id } => Response::Task {
            task: tasks.add_user(task_id, user_id)?,
        },
        Request::RemoveUserFromTask { task_id, user_id } => Response::Task {
            task: tasks.remove_user(task_id, user_id)?,
        },
        Request::ChangeTaskStatus { task_id, status } => Response::Task {
            task: tasks.change_status(task_id, status)?,
        },
        Request::ExpiredTasks => Response::Tasks {
            tasks: tasks.expired()?,
        },
    };

    Ok(response)
}

//! Task operations, user assignment and assignment notifications.

use chrono::{Local, NaiveDate};
use rusqlite::Connection;

use crate::db;
use crate::model::{Status, Task, TaskDraft, TaskQuery, User};
use crate::search::compile_search;
use crate::service::notify::{Mailer, Notifier};
use crate::service::users::user_not_found;
use crate::service::validator::validate_task;
use crate::{Result, TaskManagerError};

fn task_not_found(id: i64) -> TaskManagerError {
    TaskManagerError::NotFound(format!("Task with ID {} not found", id))
}

/// Task service bound to one connection and a notification sink.
pub struct TaskService<'a> {
    conn: &'a Connection,
    mailer: &'a Mailer,
    notifier: &'a dyn Notifier,
}

impl<'a> TaskService<'a> {
    pub fn new(conn: &'a Connection, mailer: &'a Mailer, notifier: &'a dyn Notifier) -> Self {
        Self {
            conn,
            mailer,
            notifier,
        }
    }

    fn require_user(&self, id: i64) -> Result<User> {
        db::get_user(self.conn, id)?.ok_or_else(|| user_not_found(id))
    }

    fn members(&self, task: &Task) -> Result<Vec<User>> {
        task.user_ids.iter().map(|id| self.require_user(*id)).collect()
    }

    /// List tasks by the optional listing filters.
    pub fn list(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        tracing::info!("Getting all tasks");
        db::find_tasks(self.conn, query)
    }

    /// List tasks matching a search string such as `status:OPENED,dueDate<20240101`.
    pub fn search(&self, search: Option<&str>) -> Result<Vec<Task>> {
        tracing::info!("Searching tasks");
        let predicate = compile_search::<Task>(search)?;
        db::find_tasks_matching(self.conn, &predicate)
    }

    pub fn get(&self, id: i64) -> Result<Task> {
        tracing::info!("Getting info about task {}", id);
        db::get_task(self.conn, id)?.ok_or_else(|| task_not_found(id))
    }

    /// Create an OPENED task and notify every assigned user.
    pub fn create(&self, draft: &TaskDraft) -> Result<Task> {
        tracing::info!("Creating new task");
        validate_task(draft)?;

        for id in &draft.user_ids {
            self.require_user(*id)?;
        }

        let task = db::insert_task(self.conn, draft, Status::Opened)?;

        let members = self.members(&task)?;
        for user in &members {
            self.notifier.send(self.mailer.added_to_task(user, &task, &members));
        }

        Ok(task)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting task {}", id);
        if db::delete_task(self.conn, id)? {
            Ok(())
        } else {
            Err(task_not_found(id))
        }
    }

    /// Assign a user to a task.
    ///
    /// # Errors
    /// `NotFound` for a missing user or task, `UserAlreadyInTask` when the
    /// user is already assigned.
    pub fn add_user(&self, task_id: i64, user_id: i64) -> Result<Task> {
        tracing::info!("Adding user {} to task {}", user_id, task_id);
        let user = self.require_user(user_id)?;
        self.get(task_id)?;

        if !db::add_task_user(self.conn, task_id, user_id)? {
            return Err(TaskManagerError::UserAlreadyInTask { user_id, task_id });
        }

        let task = self.get(task_id)?;
        let members = self.members(&task)?;
        self.notifier.send(self.mailer.added_to_task(&user, &task, &members));

        Ok(task)
    }

    /// Unassign a user from a task. Removing an unassigned user is a no-op.
    pub fn remove_user(&self, task_id: i64, user_id: i64) -> Result<Task> {
        tracing::info!("Removing user {} from task {}", user_id, task_id);
        let user = self.require_user(user_id)?;
        self.get(task_id)?;

        let removed = db::remove_task_user(self.conn, task_id, user_id)?;
        let task = self.get(task_id)?;

        if removed {
            self.notifier.send(self.mailer.removed_from_task(&user, &task));
        }

        Ok(task)
    }

    pub fn change_status(&self, task_id: i64, status: Status) -> Result<Task> {
        tracing::info!("Changing task {} status to {}", task_id, status);
        if !db::update_task_status(self.conn, task_id, status)? {
            return Err(task_not_found(task_id));
        }
        self.get(task_id)
    }

    /// Tasks whose due date is before `today`.
    pub fn expired_on(&self, today: NaiveDate) -> Result<Vec<Task>> {
        tracing::info!("Getting tasks expired before {}", today);
        db::find_tasks_due_before(self.conn, today)
    }

    /// Tasks whose due date has passed, by the local calendar.
    pub fn expired(&self) -> Result<Vec<Task>> {
        self.expired_on(Local::now().date_naive())
    }
}

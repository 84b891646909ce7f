//! Notification emails for task assignment changes.
//!
//! Messages are rendered here and handed to a [`Notifier`]. Delivery is
//! owned by the notifier implementation.

use std::sync::Mutex;

use crate::model::{Task, User};

/// A rendered notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Sink for outgoing notifications.
///
/// Implementations must not fail the surrounding operation; delivery
/// problems are theirs to report.
pub trait Notifier: Send + Sync {
    fn send(&self, email: Email);
}

/// Notifier that records each email as a tracing event.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, email: Email) {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "Notification: {}",
            email.body
        );
    }
}

/// Notifier that keeps sent emails in memory.
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Email>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails sent so far, oldest first.
    pub fn sent(&self) -> Vec<Email> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, email: Email) {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(email),
            Err(poisoned) => poisoned.into_inner().push(email),
        }
    }
}

/// Renders assignment emails from a fixed sender.
#[derive(Debug, Clone)]
pub struct Mailer {
    sender: String,
}

impl Mailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self { sender: sender.into() }
    }

    /// Email telling `user` they were added to `task`.
    ///
    /// `members` are the users assigned to the task after the change.
    pub fn added_to_task(&self, user: &User, task: &Task, members: &[User]) -> Email {
        let due = task
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "none".to_string());
        let members: Vec<String> = members.iter().map(|m| m.to_string()).collect();

        Email {
            from: self.sender.clone(),
            to: user.email.clone(),
            subject: "Added to task".to_string(),
            body: format!(
                "Hello {}, you have been added to task \"{}\".\n\n{}\n\nDue date: {}\nAssigned: {}",
                user.first_name,
                task.title,
                task.description,
                due,
                members.join(", ")
            ),
        }
    }

    /// Email telling `user` they were removed from `task`.
    pub fn removed_from_task(&self, user: &User, task: &Task) -> Email {
        Email {
            from: self.sender.clone(),
            to: user.email.clone(),
            subject: "Removed from task".to_string(),
            body: format!(
                "Hello {}, you have been removed from task \"{}\".",
                user.first_name, task.title
            ),
        }
    }
}

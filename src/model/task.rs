//! Task entity, its status and filterable fields.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::search::{FieldDef, FieldKind, FieldValue, Filterable};
use crate::TaskManagerError;

/// Lifecycle state of a task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Opened,
    Inprogress,
    Completed,
}

impl Status {
    /// Literal names as stored and as written in search strings.
    pub const NAMES: &'static [&'static str] = &["OPENED", "INPROGRESS", "COMPLETED"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Opened => "OPENED",
            Status::Inprogress => "INPROGRESS",
            Status::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPENED" => Ok(Status::Opened),
            "INPROGRESS" => Ok(Status::Inprogress),
            "COMPLETED" => Ok(Status::Completed),
            other => Err(TaskManagerError::TypeCoercion {
                field: "status".to_string(),
                value: other.to_string(),
                expected: "task status",
            }),
        }
    }
}

/// A stored task with the ids of its assigned users.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub user_ids: Vec<i64>,
    pub due_date: Option<NaiveDate>,
}

/// Task fields supplied on create.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub user_ids: Vec<i64>,
    pub due_date: Option<NaiveDate>,
}

/// Optional filters of the task listing; unset fields do not constrain.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    /// Exact title
    pub title: Option<String>,
    pub status: Option<Status>,
    /// Task must have this user assigned
    pub user_id: Option<i64>,
    /// Due date strictly before this day
    pub date_before: Option<NaiveDate>,
}

const TASK_FIELDS: &[FieldDef<Task>] = &[
    FieldDef {
        name: "id",
        column: "id",
        kind: FieldKind::Integer,
        accessor: |t| Some(FieldValue::Integer(t.id)),
    },
    FieldDef {
        name: "title",
        column: "title",
        kind: FieldKind::Text,
        accessor: |t| Some(FieldValue::Text(t.title.clone())),
    },
    FieldDef {
        name: "description",
        column: "description",
        kind: FieldKind::Text,
        accessor: |t| Some(FieldValue::Text(t.description.clone())),
    },
    FieldDef {
        name: "status",
        column: "status",
        kind: FieldKind::Enum(Status::NAMES),
        accessor: |t| Some(FieldValue::Enum(t.status.as_str())),
    },
    FieldDef {
        name: "dueDate",
        column: "due_date",
        kind: FieldKind::Date,
        accessor: |t| t.due_date.map(FieldValue::Date),
    },
];

impl Filterable for Task {
    const TABLE: &'static str = "tasks";

    fn fields() -> &'static [FieldDef<Self>] {
        TASK_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_names_round_trip() {
        for name in Status::NAMES {
            assert_eq!(name.parse::<Status>().unwrap().as_str(), *name);
        }
        assert!("opened".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_matches_names() {
        let json = serde_json::to_string(&Status::Inprogress).unwrap();
        assert_eq!(json, "\"INPROGRESS\"");
    }

    #[test]
    fn test_task_fields_resolve() {
        assert_eq!(Task::field("dueDate").unwrap().column, "due_date");
        assert_eq!(Task::field("status").unwrap().kind, FieldKind::Enum(Status::NAMES));
        assert!(Task::field("users").is_err());
    }

    #[test]
    fn test_task_draft_defaults_user_ids() {
        let draft: TaskDraft = serde_json::from_str(
            r#"{"title":"Write","description":"Write docs","dueDate":"2024-05-01"}"#,
        )
        .unwrap();
        assert!(draft.user_ids.is_empty());
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }
}

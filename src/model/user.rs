//! User entity and its filterable fields.

use serde::{Deserialize, Serialize};

use crate::search::{FieldDef, FieldKind, FieldValue, Filterable};

/// A stored user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i64,
}

/// User fields supplied on create and update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: i64,
}

const USER_FIELDS: &[FieldDef<User>] = &[
    FieldDef {
        name: "id",
        column: "id",
        kind: FieldKind::Integer,
        accessor: |u| Some(FieldValue::Integer(u.id)),
    },
    FieldDef {
        name: "firstName",
        column: "first_name",
        kind: FieldKind::Text,
        accessor: |u| Some(FieldValue::Text(u.first_name.clone())),
    },
    FieldDef {
        name: "lastName",
        column: "last_name",
        kind: FieldKind::Text,
        accessor: |u| Some(FieldValue::Text(u.last_name.clone())),
    },
    FieldDef {
        name: "email",
        column: "email",
        kind: FieldKind::Text,
        accessor: |u| Some(FieldValue::Text(u.email.clone())),
    },
    FieldDef {
        name: "age",
        column: "age",
        kind: FieldKind::Integer,
        accessor: |u| Some(FieldValue::Integer(u.age)),
    },
];

impl Filterable for User {
    const TABLE: &'static str = "users";

    fn fields() -> &'static [FieldDef<Self>] {
        USER_FIELDS
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} <{}>", self.first_name, self.last_name, self.email)
    }
}

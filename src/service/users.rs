//! User operations on top of the database layer.

use rusqlite::Connection;

use crate::db;
use crate::model::{User, UserDraft};
use crate::search::compile_search;
use crate::service::validator::validate_user;
use crate::{Result, TaskManagerError};

pub(crate) fn user_not_found(id: i64) -> TaskManagerError {
    TaskManagerError::NotFound(format!("User with ID {} not found", id))
}

/// User service bound to one connection.
pub struct UserService<'a> {
    conn: &'a Connection,
}

impl<'a> UserService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List users, optionally narrowed by a search string such as
    /// `firstName:John,age>=20`.
    pub fn list(&self, search: Option<&str>) -> Result<Vec<User>> {
        tracing::info!("Getting all users");
        let predicate = compile_search::<User>(search)?;
        db::find_users(self.conn, &predicate)
    }

    pub fn get(&self, id: i64) -> Result<User> {
        tracing::info!("Getting info about user {}", id);
        db::get_user(self.conn, id)?.ok_or_else(|| user_not_found(id))
    }

    pub fn create(&self, draft: &UserDraft) -> Result<User> {
        tracing::info!("Creating new user");
        validate_user(draft)?;
        db::insert_user(self.conn, draft)
    }

    pub fn update(&self, id: i64, draft: &UserDraft) -> Result<User> {
        tracing::info!("Updating user {}", id);
        validate_user(draft)?;
        db::update_user(self.conn, id, draft)?.ok_or_else(|| user_not_found(id))
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        tracing::info!("Deleting user {}", id);
        if db::delete_user(self.conn, id)? {
            Ok(())
        } else {
            Err(user_not_found(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn draft(first_name: &str, age: i64) -> UserDraft {
        UserDraft {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            email: format!("{}@gmail.com", first_name.to_lowercase()),
            age,
        }
    }

    #[test]
    fn test_list_with_search() {
        let db = open_in_memory().unwrap();
        let users = UserService::new(db.conn());
        users.create(&draft("John", 18)).unwrap();
        let wanted = users.create(&draft("John", 25)).unwrap();
        users.create(&draft("Jane", 30)).unwrap();

        assert_eq!(users.list(None).unwrap().len(), 3);
        assert_eq!(users.list(Some("firstName:John,age>=20")).unwrap(), vec![wanted]);
    }

    #[test]
    fn test_list_rejects_bad_search() {
        let db = open_in_memory().unwrap();
        let users = UserService::new(db.conn());

        assert!(matches!(
            users.list(Some("age:notanumber")),
            Err(TaskManagerError::TypeCoercion { .. })
        ));
        assert!(matches!(
            users.list(Some("nonexistentField:x")),
            Err(TaskManagerError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_create_validates() {
        let db = open_in_memory().unwrap();
        let users = UserService::new(db.conn());
        assert!(matches!(
            users.create(&draft("J=", 18)),
            Err(TaskManagerError::Validation(_))
        ));
        assert!(users.list(None).unwrap().is_empty());
    }

    #[test]
    fn test_missing_user() {
        let db = open_in_memory().unwrap();
        let users = UserService::new(db.conn());

        assert!(matches!(users.get(5), Err(TaskManagerError::NotFound(_))));
        assert!(matches!(users.delete(5), Err(TaskManagerError::NotFound(_))));
        assert!(matches!(
            users.update(5, &draft("John", 18)),
            Err(TaskManagerError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        let db = open_in_memory().unwrap();
        let users = UserService::new(db.conn());
        let user = users.create(&draft("John", 18)).unwrap();

        let updated = users.update(user.id, &draft("Jack", 19)).unwrap();
        assert_eq!(updated.first_name, "Jack");
        assert_eq!(users.get(user.id).unwrap(), updated);

        users.delete(user.id).unwrap();
        assert!(users.list(None).unwrap().is_empty());
    }
}

//! Database operations module - user and task CRUD plus filtered reads.
//!
//! All reads return rows in primary key order. Filtered reads take a
//! compiled search predicate and push it down as a WHERE clause.

use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::model::{Status, Task, TaskDraft, TaskQuery, User, UserDraft};
use crate::search::{build_select, parse_date, CompiledPredicate, SqlParam};
use crate::{TaskManagerError, Result};

const USER_COLUMNS: &str = "id, first_name, last_name, email, age";
const TASK_COLUMNS: &str = "id, title, description, status, due_date";

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> TaskManagerError + '_ {
    move |e| TaskManagerError::Database(format!("{}: {}", context, e))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        age: row.get(4)?,
    })
}

/// Task columns as stored, before status and date are decoded.
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    status: String,
    due_date: Option<String>,
}

fn task_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        due_date: row.get(4)?,
    })
}

fn decode_task(conn: &Connection, raw: TaskRow) -> Result<Task> {
    let status: Status = raw
        .status
        .parse()
        .map_err(|_| TaskManagerError::Database(format!("Task {} has invalid status '{}'", raw.id, raw.status)))?;

    let due_date = match raw.due_date {
        Some(text) => Some(parse_date(&text).ok_or_else(|| {
            TaskManagerError::Database(format!("Task {} has invalid due date '{}'", raw.id, text))
        })?),
        None => None,
    };

    Ok(Task {
        id: raw.id,
        title: raw.title,
        description: raw.description,
        status,
        user_ids: task_user_ids(conn, raw.id)?,
        due_date,
    })
}

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ---- Users ----

/// Insert a user, returning the stored row.
pub fn insert_user(conn: &Connection, draft: &UserDraft) -> Result<User> {
    conn.execute(
        "INSERT INTO users (first_name, last_name, email, age) VALUES (?1, ?2, ?3, ?4)",
        params![draft.first_name, draft.last_name, draft.email, draft.age],
    )
    .map_err(db_err("Failed to insert user"))?;

    Ok(User {
        id: conn.last_insert_rowid(),
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        email: draft.email.clone(),
        age: draft.age,
    })
}

/// Get a user by id.
pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![id],
        user_from_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(TaskManagerError::Database(format!("Failed to get user: {}", e))),
    }
}

/// Replace a user's fields. Returns `None` when no such user exists.
pub fn update_user(conn: &Connection, id: i64, draft: &UserDraft) -> Result<Option<User>> {
    let changed = conn
        .execute(
            "UPDATE users SET first_name = ?1, last_name = ?2, email = ?3, age = ?4 WHERE id = ?5",
            params![draft.first_name, draft.last_name, draft.email, draft.age, id],
        )
        .map_err(db_err("Failed to update user"))?;

    if changed == 0 {
        return Ok(None);
    }

    get_user(conn, id)
}

/// Delete a user and its task assignments.
///
/// # Returns
/// Whether a user was deleted.
pub fn delete_user(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM users WHERE id = ?1", params![id])
        .map_err(db_err("Failed to delete user"))?;

    Ok(deleted > 0)
}

/// Find users accepted by a compiled search predicate.
pub fn find_users(conn: &Connection, predicate: &CompiledPredicate<User>) -> Result<Vec<User>> {
    let (sql, params) = build_select(predicate, USER_COLUMNS);

    let mut stmt = conn
        .prepare(&sql)
        .map_err(db_err("Failed to prepare user search"))?;

    let rows = stmt
        .query_map(params_from_iter(params.iter()), user_from_row)
        .map_err(db_err("Failed to execute user search"))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row.map_err(db_err("Failed to read row"))?);
    }

    Ok(results)
}

// ---- Tasks ----

/// Insert a task together with its user assignments.
///
/// Callers are expected to have checked that every user id exists.
pub fn insert_task(conn: &Connection, draft: &TaskDraft, status: Status) -> Result<Task> {
    let tx = conn
        .unchecked_transaction()
        .map_err(db_err("Failed to start transaction"))?;

    tx.execute(
        "INSERT INTO tasks (title, description, status, due_date) VALUES (?1, ?2, ?3, ?4)",
        params![
            draft.title,
            draft.description,
            status.as_str(),
            draft.due_date.map(date_param),
        ],
    )
    .map_err(db_err("Failed to insert task"))?;

    let id = tx.last_insert_rowid();

    {
        let mut stmt = tx
            .prepare_cached("INSERT OR IGNORE INTO task_users (task_id, user_id) VALUES (?1, ?2)")
            .map_err(db_err("Failed to prepare statement"))?;

        for user_id in &draft.user_ids {
            stmt.execute(params![id, user_id])
                .map_err(db_err("Failed to assign user"))?;
        }
    }

    tx.commit().map_err(db_err("Failed to commit transaction"))?;

    get_task(conn, id)?
        .ok_or_else(|| TaskManagerError::Database(format!("Task {} vanished after insert", id)))
}

/// Get a task by id, including its assigned user ids.
pub fn get_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
        params![id],
        task_row,
    );

    match result {
        Ok(raw) => Ok(Some(decode_task(conn, raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(TaskManagerError::Database(format!("Failed to get task: {}", e))),
    }
}

/// Delete a task and its assignments.
///
/// # Returns
/// Whether a task was deleted.
pub fn delete_task(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM tasks WHERE id = ?1", params![id])
        .map_err(db_err("Failed to delete task"))?;

    Ok(deleted > 0)
}

/// Set a task's status. Returns whether the task exists.
pub fn update_task_status(conn: &Connection, id: i64, status: Status) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE tasks SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )
        .map_err(db_err("Failed to update task status"))?;

    Ok(changed > 0)
}

/// Assign a user to a task. Returns `false` when already assigned.
pub fn add_task_user(conn: &Connection, task_id: i64, user_id: i64) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO task_users (task_id, user_id) VALUES (?1, ?2)",
            params![task_id, user_id],
        )
        .map_err(db_err("Failed to assign user"))?;

    Ok(inserted > 0)
}

/// Unassign a user from a task. Returns `false` when not assigned.
pub fn remove_task_user(conn: &Connection, task_id: i64, user_id: i64) -> Result<bool> {
    let removed = conn
        .execute(
            "DELETE FROM task_users WHERE task_id = ?1 AND user_id = ?2",
            params![task_id, user_id],
        )
        .map_err(db_err("Failed to unassign user"))?;

    Ok(removed > 0)
}

/// Ids of the users assigned to a task, ascending.
pub fn task_user_ids(conn: &Connection, task_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn
        .prepare_cached("SELECT user_id FROM task_users WHERE task_id = ?1 ORDER BY user_id")
        .map_err(db_err("Failed to prepare assignment query"))?;

    let rows = stmt
        .query_map(params![task_id], |row| row.get(0))
        .map_err(db_err("Failed to query assignments"))?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(row.map_err(db_err("Failed to read row"))?);
    }

    Ok(ids)
}

fn query_tasks(conn: &Connection, sql: &str, params: &[SqlParam]) -> Result<Vec<Task>> {
    let raws = {
        let mut stmt = conn
            .prepare(sql)
            .map_err(db_err("Failed to prepare task query"))?;

        let rows = stmt
            .query_map(params_from_iter(params.iter()), task_row)
            .map_err(db_err("Failed to execute task query"))?;

        let mut raws = Vec::new();
        for row in rows {
            raws.push(row.map_err(db_err("Failed to read row"))?);
        }
        raws
    };

    raws.into_iter().map(|raw| decode_task(conn, raw)).collect()
}

/// Find tasks by the optional listing filters.
///
/// Unset filters do not constrain the result; a task without assignments
/// is still listed when no `user_id` is given.
pub fn find_tasks(conn: &Connection, query: &TaskQuery) -> Result<Vec<Task>> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();

    if let Some(ref title) = query.title {
        conditions.push("title = ?");
        params.push(SqlParam::Text(title.clone()));
    }

    if let Some(status) = query.status {
        conditions.push("status = ?");
        params.push(SqlParam::Text(status.as_str().to_string()));
    }

    if let Some(user_id) = query.user_id {
        conditions.push(
            "EXISTS (SELECT 1 FROM task_users tu WHERE tu.task_id = tasks.id AND tu.user_id = ?)",
        );
        params.push(SqlParam::Integer(user_id));
    }

    if let Some(date) = query.date_before {
        conditions.push("due_date < ?");
        params.push(SqlParam::Text(date_param(date)));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!("SELECT {} FROM tasks{} ORDER BY id", TASK_COLUMNS, where_clause);
    query_tasks(conn, &sql, &params)
}

/// Find tasks accepted by a compiled search predicate.
pub fn find_tasks_matching(conn: &Connection, predicate: &CompiledPredicate<Task>) -> Result<Vec<Task>> {
    let (sql, params) = build_select(predicate, TASK_COLUMNS);
    query_tasks(conn, &sql, &params)
}

/// Find tasks whose due date lies strictly before `day`.
pub fn find_tasks_due_before(conn: &Connection, day: NaiveDate) -> Result<Vec<Task>> {
    find_tasks(
        conn,
        &TaskQuery {
            date_before: Some(day),
            ..TaskQuery::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::search::{compile_search, Filterable};

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init(&conn).unwrap();
        conn
    }

    fn draft(first_name: &str, last_name: &str, age: i64) -> UserDraft {
        UserDraft {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@gmail.com", first_name.to_lowercase()),
            age,
        }
    }

    fn task_draft(title: &str, user_ids: Vec<i64>, due_date: Option<NaiveDate>) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: format!("This is {}", title),
            user_ids,
            due_date,
        }
    }

    fn seed_users(conn: &Connection) -> Vec<User> {
        vec![
            insert_user(conn, &draft("John", "Doe", 18)).unwrap(),
            insert_user(conn, &draft("John", "Smith", 25)).unwrap(),
            insert_user(conn, &draft("Jane", "Smith", 30)).unwrap(),
            insert_user(conn, &draft("Amy", "Pond", 41)).unwrap(),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_insert_and_get_user() {
        let conn = setup_test_db();
        let user = insert_user(&conn, &draft("John", "Doe", 18)).unwrap();
        assert!(user.id > 0);

        let loaded = get_user(&conn, user.id).unwrap();
        assert_eq!(loaded, Some(user));
        assert_eq!(get_user(&conn, 999).unwrap(), None);
    }

    #[test]
    fn test_update_user() {
        let conn = setup_test_db();
        let user = insert_user(&conn, &draft("John", "Doe", 18)).unwrap();

        let updated = update_user(&conn, user.id, &draft("Johnny", "Doe", 19))
            .unwrap()
            .unwrap();
        assert_eq!(updated.first_name, "Johnny");
        assert_eq!(updated.age, 19);

        assert!(update_user(&conn, 999, &draft("X", "Y", 1)).unwrap().is_none());
    }

    #[test]
    fn test_delete_user() {
        let conn = setup_test_db();
        let user = insert_user(&conn, &draft("John", "Doe", 18)).unwrap();
        assert!(delete_user(&conn, user.id).unwrap());
        assert!(!delete_user(&conn, user.id).unwrap());
    }

    #[test]
    fn test_find_users_push_down() {
        let conn = setup_test_db();
        seed_users(&conn);

        let predicate = compile_search::<User>(Some("firstName:John,age>=20")).unwrap();
        let found = find_users(&conn, &predicate).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].last_name, "Smith");
    }

    #[test]
    fn test_find_users_substring_is_case_sensitive() {
        let conn = setup_test_db();
        seed_users(&conn);

        let predicate = compile_search::<User>(Some("lastName:mith")).unwrap();
        assert_eq!(find_users(&conn, &predicate).unwrap().len(), 2);

        let predicate = compile_search::<User>(Some("lastName:SMITH")).unwrap();
        assert!(find_users(&conn, &predicate).unwrap().is_empty());
    }

    #[test]
    fn test_push_down_agrees_with_in_memory() {
        let conn = setup_test_db();
        let all = seed_users(&conn);

        let searches = [
            "",
            "firstName:J",
            "age>18,age<41",
            "lastName>Doe",
            "firstName<=Jane",
            "age:30",
            "email:gmail,age<=25",
            "id>=2,firstName:Amy",
        ];

        for search in searches {
            let predicate = compile_search::<User>(Some(search)).unwrap();
            let pushed = find_users(&conn, &predicate).unwrap();
            let in_memory: Vec<User> = predicate.filter(&all).into_iter().cloned().collect();
            assert_eq!(pushed, in_memory, "search '{}'", search);
        }
    }

    #[test]
    fn test_insert_task_with_users() {
        let conn = setup_test_db();
        let users = seed_users(&conn);

        let task = insert_task(
            &conn,
            &task_draft("firstTask", vec![users[1].id, users[0].id], date(2023, 1, 8)),
            Status::Opened,
        )
        .unwrap();

        assert_eq!(task.status, Status::Opened);
        assert_eq!(task.user_ids, vec![users[0].id, users[1].id]);
        assert_eq!(task.due_date, date(2023, 1, 8));
        assert_eq!(get_task(&conn, task.id).unwrap(), Some(task));
    }

    #[test]
    fn test_task_assignments() {
        let conn = setup_test_db();
        let users = seed_users(&conn);
        let task = insert_task(&conn, &task_draft("task", vec![], None), Status::Opened).unwrap();

        assert!(add_task_user(&conn, task.id, users[2].id).unwrap());
        assert!(!add_task_user(&conn, task.id, users[2].id).unwrap());
        assert_eq!(task_user_ids(&conn, task.id).unwrap(), vec![users[2].id]);

        assert!(remove_task_user(&conn, task.id, users[2].id).unwrap());
        assert!(!remove_task_user(&conn, task.id, users[2].id).unwrap());
        assert!(task_user_ids(&conn, task.id).unwrap().is_empty());
    }

    #[test]
    fn test_deleting_user_drops_assignment() {
        let conn = setup_test_db();
        let users = seed_users(&conn);
        let task =
            insert_task(&conn, &task_draft("task", vec![users[0].id], None), Status::Opened).unwrap();

        delete_user(&conn, users[0].id).unwrap();
        assert!(task_user_ids(&conn, task.id).unwrap().is_empty());
    }

    #[test]
    fn test_update_task_status_and_delete() {
        let conn = setup_test_db();
        let task = insert_task(&conn, &task_draft("task", vec![], None), Status::Opened).unwrap();

        assert!(update_task_status(&conn, task.id, Status::Completed).unwrap());
        assert_eq!(get_task(&conn, task.id).unwrap().unwrap().status, Status::Completed);
        assert!(!update_task_status(&conn, 999, Status::Completed).unwrap());

        assert!(delete_task(&conn, task.id).unwrap());
        assert_eq!(get_task(&conn, task.id).unwrap(), None);
    }

    #[test]
    fn test_find_tasks_filters() {
        let conn = setup_test_db();
        let users = seed_users(&conn);
        let first = insert_task(
            &conn,
            &task_draft("firstTask", vec![users[0].id, users[1].id], date(2023, 1, 8)),
            Status::Opened,
        )
        .unwrap();
        let second =
            insert_task(&conn, &task_draft("secondTask", vec![], date(2021, 4, 8)), Status::Completed)
                .unwrap();
        let third = insert_task(
            &conn,
            &task_draft("thirdTask", vec![users[1].id], date(2022, 1, 8)),
            Status::Opened,
        )
        .unwrap();

        let ids = |query: TaskQuery| -> Vec<i64> {
            find_tasks(&conn, &query).unwrap().iter().map(|t| t.id).collect()
        };

        assert_eq!(ids(TaskQuery::default()), vec![first.id, second.id, third.id]);
        assert_eq!(
            ids(TaskQuery { title: Some("secondTask".into()), ..Default::default() }),
            vec![second.id]
        );
        assert_eq!(
            ids(TaskQuery { status: Some(Status::Opened), ..Default::default() }),
            vec![first.id, third.id]
        );
        assert_eq!(
            ids(TaskQuery { user_id: Some(users[1].id), ..Default::default() }),
            vec![first.id, third.id]
        );
        assert_eq!(
            ids(TaskQuery {
                user_id: Some(users[1].id),
                date_before: date(2022, 6, 1),
                ..Default::default()
            }),
            vec![third.id]
        );
    }

    #[test]
    fn test_find_tasks_due_before_skips_undated() {
        let conn = setup_test_db();
        let old = insert_task(&conn, &task_draft("old", vec![], date(2020, 1, 1)), Status::Opened)
            .unwrap();
        insert_task(&conn, &task_draft("undated", vec![], None), Status::Opened).unwrap();
        insert_task(&conn, &task_draft("future", vec![], date(2030, 1, 1)), Status::Opened)
            .unwrap();

        let expired = find_tasks_due_before(&conn, date(2024, 1, 1).unwrap()).unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, old.id);
    }

    #[test]
    fn test_find_tasks_matching_agrees_with_in_memory() {
        let conn = setup_test_db();
        let users = seed_users(&conn);
        insert_task(&conn, &task_draft("alpha", vec![users[0].id], date(2023, 1, 8)), Status::Opened)
            .unwrap();
        insert_task(&conn, &task_draft("beta", vec![], None), Status::Completed).unwrap();
        insert_task(&conn, &task_draft("gamma", vec![], date(2021, 4, 8)), Status::Opened).unwrap();

        let all = find_tasks(&conn, &TaskQuery::default()).unwrap();
        for search in ["status:OPENED", "dueDate>=20220101", "dueDate<20240101,title:a", "description:beta"] {
            let predicate = compile_search::<Task>(Some(search)).unwrap();
            let pushed = find_tasks_matching(&conn, &predicate).unwrap();
            let in_memory: Vec<Task> = predicate.filter(&all).into_iter().cloned().collect();
            assert_eq!(pushed, in_memory, "search '{}' on {}", search, Task::TABLE);
        }
    }

    #[test]
    fn test_status_names_filter_both_paths() {
        let conn = setup_test_db();
        let opened = insert_task(&conn, &task_draft("alpha", vec![], None), Status::Opened).unwrap();
        let started = insert_task(&conn, &task_draft("beta", vec![], None), Status::Opened).unwrap();
        let done = insert_task(&conn, &task_draft("gamma", vec![], None), Status::Opened).unwrap();
        update_task_status(&conn, started.id, Status::Inprogress).unwrap();
        update_task_status(&conn, done.id, Status::Completed).unwrap();

        let all = find_tasks(&conn, &TaskQuery::default()).unwrap();
        for (search, expected) in [
            ("status:OPENED", opened.id),
            ("status:INPROGRESS", started.id),
            ("status:COMPLETED", done.id),
        ] {
            let predicate = compile_search::<Task>(Some(search)).unwrap();
            let pushed: Vec<i64> = find_tasks_matching(&conn, &predicate)
                .unwrap()
                .iter()
                .map(|t| t.id)
                .collect();
            let in_memory: Vec<i64> = predicate.filter(&all).iter().map(|t| t.id).collect();
            assert_eq!(pushed, vec![expected], "search '{}'", search);
            assert_eq!(in_memory, pushed, "search '{}'", search);
        }
    }
}

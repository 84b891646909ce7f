//! Field validation for user and task input.
//!
//! Every rule is checked and all violations are reported together.

use chrono::Datelike;

use crate::model::{TaskDraft, UserDraft};
use crate::{Result, TaskManagerError};

/// Due dates are stored as ISO text, which only sorts by date for these years.
const DUE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Characters rejected in user names.
const NAME_BLACKLIST: &[char] = &['?', '|', '-', '='];

fn check_length(errors: &mut Vec<String>, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(format!("{} must be between {} and {} characters", field, min, max));
    }
}

fn finish(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TaskManagerError::Validation(errors))
    }
}

/// Validate user input.
pub fn validate_user(user: &UserDraft) -> Result<()> {
    let mut errors = Vec::new();

    check_length(&mut errors, "firstName", &user.first_name, 2, 100);
    check_length(&mut errors, "lastName", &user.last_name, 2, 100);
    check_length(&mut errors, "email", &user.email, 5, 100);

    if user.first_name.contains(NAME_BLACKLIST) {
        errors.push("first name contains forbidden characters".to_string());
    }
    if user.last_name.contains(NAME_BLACKLIST) {
        errors.push("last name contains forbidden characters".to_string());
    }

    match user.email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => errors.push("email must be a well-formed email address".to_string()),
    }

    if user.age < 1 {
        errors.push("age must be at least 1".to_string());
    }

    finish(errors)
}

/// Validate task input.
pub fn validate_task(task: &TaskDraft) -> Result<()> {
    let mut errors = Vec::new();

    check_length(&mut errors, "title", &task.title, 2, 100);
    check_length(&mut errors, "description", &task.description, 2, 300);

    if let Some(due) = task.due_date {
        if !DUE_YEARS.contains(&due.year()) {
            errors.push("dueDate must have a four-digit year".to_string());
        }
    }

    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first_name: &str, last_name: &str, email: &str, age: i64) -> UserDraft {
        UserDraft {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            age,
        }
    }

    fn errors(result: Result<()>) -> Vec<String> {
        match result {
            Err(TaskManagerError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(validate_user(&user("John", "Doe", "john@gmail.com", 18)).is_ok());
    }

    #[test]
    fn test_blacklisted_name_characters() {
        let errors = errors(validate_user(&user("Jo?hn", "Doe-Smith", "john@gmail.com", 18)));
        assert_eq!(
            errors,
            vec![
                "first name contains forbidden characters".to_string(),
                "last name contains forbidden characters".to_string(),
            ]
        );
    }

    #[test]
    fn test_all_violations_reported() {
        let errors = errors(validate_user(&user("J", "D", "nope", 0)));
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().any(|e| e.starts_with("firstName")));
        assert!(errors.iter().any(|e| e.starts_with("age")));
    }

    #[test]
    fn test_task_lengths() {
        let task = TaskDraft {
            title: "T".to_string(),
            description: "x".repeat(301),
            user_ids: vec![],
            due_date: None,
        };
        assert_eq!(errors(validate_task(&task)).len(), 2);

        let task = TaskDraft {
            title: "Write docs".to_string(),
            description: "Document the search syntax".to_string(),
            user_ids: vec![1],
            due_date: None,
        };
        assert!(validate_task(&task).is_ok());
    }

    #[test]
    fn test_due_date_year_range() {
        let task = |due_date| TaskDraft {
            title: "Write docs".to_string(),
            description: "Document the search syntax".to_string(),
            user_ids: vec![],
            due_date,
        };

        assert!(validate_task(&task(chrono::NaiveDate::from_ymd_opt(9999, 12, 31))).is_ok());
        assert!(validate_task(&task(chrono::NaiveDate::from_ymd_opt(0, 1, 1))).is_ok());
        assert_eq!(
            errors(validate_task(&task(chrono::NaiveDate::from_ymd_opt(10000, 1, 1)))),
            vec!["dueDate must have a four-digit year".to_string()]
        );
        assert_eq!(
            errors(validate_task(&task(chrono::NaiveDate::from_ymd_opt(-5, 1, 1)))).len(),
            1
        );
    }
}

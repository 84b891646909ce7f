//! SQL query builder for compiled predicates.
//!
//! Converts a CompiledPredicate into a parameterized SQL WHERE clause.
//! Uses prepared statement parameters to prevent SQL injection.

use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;

use super::fields::{FieldValue, Filterable};
use super::predicate::{CompiledPredicate, Test};

/// SQL parameter value for prepared statements.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text parameter (strings, ISO dates, enum names)
    Text(String),
    /// Integer parameter
    Integer(i64),
}

impl From<&FieldValue> for SqlParam {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Integer(n) => SqlParam::Integer(*n),
            other => SqlParam::Text(other.to_string()),
        }
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Integer(n) => n.to_sql(),
        }
    }
}

/// Build the WHERE condition for a compiled predicate.
///
/// Returns `(condition, params)`; the condition is empty when the predicate
/// accepts everything. Substring tests use `instr` because SQLite `LIKE`
/// ignores ASCII case.
///
/// # Examples
///
/// ```
/// use taskmanager::model::User;
/// use taskmanager::search::{build_where_clause, compile, parse_search, SqlParam};
///
/// let criteria = parse_search(Some("firstName:Jo,age>=18")).unwrap();
/// let predicate = compile::<User>(&criteria).unwrap();
/// let (condition, params) = build_where_clause(&predicate);
/// assert_eq!(condition, "instr(first_name, ?) > 0 AND age >= ?");
/// assert_eq!(params, vec![SqlParam::Text("Jo".into()), SqlParam::Integer(18)]);
/// ```
pub fn build_where_clause<E: Filterable>(predicate: &CompiledPredicate<E>) -> (String, Vec<SqlParam>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();

    for term in predicate.terms() {
        let column = term.field().column;
        match term.test() {
            Test::Contains(needle) => {
                conditions.push(format!("instr({}, ?) > 0", column));
                params.push(SqlParam::Text(needle.clone()));
            }
            Test::Equals(value) => {
                conditions.push(format!("{} = ?", column));
                params.push(SqlParam::from(value));
            }
            Test::Compare(op, value) => {
                conditions.push(format!("{} {} ?", column, op.symbol()));
                params.push(SqlParam::from(value));
            }
        }
    }

    (conditions.join(" AND "), params)
}

/// Build a complete SELECT over the entity table.
///
/// Rows come back in primary key order so the push-down path returns the
/// same sequence as filtering an id-ordered collection in memory.
pub fn build_select<E: Filterable>(
    predicate: &CompiledPredicate<E>,
    columns: &str,
) -> (String, Vec<SqlParam>) {
    let (condition, params) = build_where_clause(predicate);

    let where_clause = if condition.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", condition)
    };

    let sql = format!(
        "SELECT {} FROM {}{} ORDER BY id",
        columns,
        E::TABLE,
        where_clause
    );

    tracing::debug!("Push-down query: {}", sql);

    (sql, params)
}

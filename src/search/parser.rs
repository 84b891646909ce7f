//! Search string parser using pest grammar.
//!
//! Parses search strings like `firstName:John,age>=20` into an ordered
//! CriteriaSet. Parsing is best-effort: text that does not form a clause
//! is dropped and never produces an error.

use pest::Parser;
use pest_derive::Parser;

use super::filters::*;
use crate::{Result, TaskManagerError};

#[derive(Parser)]
#[grammar = "search/grammar.pest"]
struct SearchParser;

/// Parse an optional search string into criteria.
///
/// A trailing comma is appended before parsing so the last clause is
/// terminated like every other one. `None` and `""` both yield an empty set.
///
/// # Examples
///
/// ```
/// use taskmanager::search::{parse_search, Operator};
///
/// let criteria = parse_search(Some("age>=18")).unwrap();
/// let first = criteria.iter().next().unwrap();
/// assert_eq!(first.field, "age");
/// assert_eq!(first.operator, Operator::GreaterEqual);
/// assert_eq!(first.value, "18");
/// ```
pub fn parse_search(search: Option<&str>) -> Result<CriteriaSet> {
    let Some(search) = search else {
        return Ok(CriteriaSet::default());
    };

    let input = format!("{},", search);
    let mut pairs = SearchParser::parse(Rule::search, &input)
        .map_err(|e| TaskManagerError::Query(e.to_string()))?;

    let mut criteria = Vec::new();
    let Some(root) = pairs.next() else {
        return Ok(CriteriaSet::default());
    };

    for clause in root.into_inner() {
        if clause.as_rule() != Rule::clause {
            continue;
        }

        let mut parts = clause.into_inner();
        let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let Some(operator) = Operator::from_symbol(operator.as_str()) else {
            continue;
        };

        criteria.push(SearchCriterion::new(field.as_str(), operator, value.as_str()));
    }

    tracing::debug!("Parsed {} search criteria from '{}'", criteria.len(), search);

    Ok(CriteriaSet::new(criteria))
}

//! Criterion types for search queries.
//!
//! Defines the structured clauses that result from parsing search syntax
//! like `firstName:John`, `age>=18`, `dueDate<20240101`.

use std::fmt;

/// Operator of a single search clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Substring match for text attributes, equality otherwise: firstName:oh
    Matches,
    /// Greater than: age>18
    GreaterThan,
    /// Greater than or equal: age>=18
    GreaterEqual,
    /// Less than: age<18
    LessThan,
    /// Less than or equal: age<=18
    LessEqual,
}

impl Operator {
    /// Operator token as written in a search string.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Matches => ":",
            Operator::GreaterThan => ">",
            Operator::GreaterEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessEqual => "<=",
        }
    }

    /// Resolve a grammar token into an operator.
    pub fn from_symbol(token: &str) -> Option<Self> {
        match token {
            ":" => Some(Operator::Matches),
            ">" => Some(Operator::GreaterThan),
            ">=" => Some(Operator::GreaterEqual),
            "<" => Some(Operator::LessThan),
            "<=" => Some(Operator::LessEqual),
            _ => None,
        }
    }

    /// Whether the operator needs a totally ordered attribute.
    pub fn is_relational(&self) -> bool {
        !matches!(self, Operator::Matches)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One parsed `field operator value` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriterion {
    /// Attribute name as supplied by the caller
    pub field: String,
    pub operator: Operator,
    /// Raw literal, coerced at compile time
    pub value: String,
}

impl SearchCriterion {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Ordered criteria of one search request, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    criteria: Vec<SearchCriterion>,
}

impl CriteriaSet {
    pub fn new(criteria: Vec<SearchCriterion>) -> Self {
        Self { criteria }
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchCriterion> {
        self.criteria.iter()
    }
}

impl<'a> IntoIterator for &'a CriteriaSet {
    type Item = &'a SearchCriterion;
    type IntoIter = std::slice::Iter<'a, SearchCriterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}

impl FromIterator<SearchCriterion> for CriteriaSet {
    fn from_iter<I: IntoIterator<Item = SearchCriterion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

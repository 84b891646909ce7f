//! Predicate compiler for parsed search criteria.
//!
//! Resolves every criterion against the entity's field table, coerces its
//! raw value and produces a [`CompiledPredicate`]. Compilation is
//! all-or-nothing: the first unknown attribute, failed coercion or
//! unsupported operator aborts it.

use std::cmp::Ordering;

use super::fields::{FieldDef, FieldValue, Filterable};
use super::filters::{CriteriaSet, Operator};
use crate::{Result, TaskManagerError};

/// Test applied to a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    /// Case-sensitive substring containment (text attributes under `:`)
    Contains(String),
    /// Exact equality (non-text attributes under `:`)
    Equals(FieldValue),
    /// Ordering comparison with a relational operator
    Compare(Operator, FieldValue),
}

/// One compiled criterion: an attribute and the test applied to it.
pub struct Term<E: 'static> {
    field: &'static FieldDef<E>,
    test: Test,
}

impl<E: 'static> Term<E> {
    pub fn field(&self) -> &'static FieldDef<E> {
        self.field
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    /// Evaluate against an entity. Absent attribute values never match.
    pub fn matches(&self, entity: &E) -> bool {
        let Some(actual) = self.field.get(entity) else {
            return false;
        };

        match &self.test {
            Test::Contains(needle) => match actual {
                FieldValue::Text(text) => text.contains(needle.as_str()),
                _ => false,
            },
            Test::Equals(expected) => actual == *expected,
            Test::Compare(op, bound) => match actual.compare(bound) {
                Some(ordering) => satisfies(*op, ordering),
                None => false,
            },
        }
    }
}

fn satisfies(op: Operator, ordering: Ordering) -> bool {
    match op {
        Operator::GreaterThan => ordering == Ordering::Greater,
        Operator::GreaterEqual => ordering != Ordering::Less,
        Operator::LessThan => ordering == Ordering::Less,
        Operator::LessEqual => ordering != Ordering::Greater,
        Operator::Matches => ordering == Ordering::Equal,
    }
}

/// Conjunction of compiled terms over entity type `E`.
///
/// An empty predicate accepts every entity.
pub struct CompiledPredicate<E: 'static> {
    terms: Vec<Term<E>>,
}

impl<E: Filterable> CompiledPredicate<E> {
    /// Predicate that accepts everything.
    pub fn match_all() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn terms(&self) -> &[Term<E>] {
        &self.terms
    }

    pub fn is_match_all(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate all terms left to right, stopping at the first miss.
    pub fn matches(&self, entity: &E) -> bool {
        self.terms.iter().all(|term| term.matches(entity))
    }

    /// Stable in-memory filter over borrowed entities.
    pub fn filter<'a, I>(&self, entities: I) -> Vec<&'a E>
    where
        I: IntoIterator<Item = &'a E>,
    {
        entities
            .into_iter()
            .filter(|entity| self.matches(entity))
            .collect()
    }

    /// Stable in-memory filter over owned entities.
    pub fn retain(&self, entities: Vec<E>) -> Vec<E> {
        entities
            .into_iter()
            .filter(|entity| self.matches(entity))
            .collect()
    }
}

/// Compile criteria against the field table of `E`.
///
/// # Errors
///
/// - `UnknownAttribute` when a criterion names a field `E` does not have
/// - `TypeCoercion` when a value cannot be read as the attribute's type
/// - `UnsupportedOperator` for relational operators on enumerations
pub fn compile<E: Filterable>(criteria: &CriteriaSet) -> Result<CompiledPredicate<E>> {
    let mut terms = Vec::with_capacity(criteria.len());

    for criterion in criteria {
        let field = E::field(&criterion.field)?;

        let test = if criterion.operator.is_relational() {
            if !field.kind.is_ordered() {
                return Err(TaskManagerError::UnsupportedOperator {
                    field: criterion.field.clone(),
                    operator: criterion.operator.symbol(),
                });
            }
            Test::Compare(criterion.operator, field.coerce(&criterion.value)?)
        } else if field.kind.is_textual() {
            Test::Contains(criterion.value.clone())
        } else {
            Test::Equals(field.coerce(&criterion.value)?)
        };

        terms.push(Term { field, test });
    }

    tracing::debug!("Compiled {} terms for {}", terms.len(), E::TABLE);

    Ok(CompiledPredicate { terms })
}

//! Search module - filter parsing, predicate compilation and SQL generation.
//!
//! This module provides the attribute filter language used by list
//! endpoints, enabling searches like `firstName:John,age>=20`.
//!
//! A search string is parsed into a [`CriteriaSet`], compiled against an
//! entity's field table into a [`CompiledPredicate`], and then either
//! evaluated in memory or pushed down to SQLite as a WHERE clause.

pub mod fields;
pub mod filters;
pub mod parser;
pub mod predicate;
pub mod query;

pub use fields::{parse_date, FieldDef, FieldKind, FieldValue, Filterable};
pub use filters::*;
pub use parser::parse_search;
pub use predicate::{compile, CompiledPredicate, Term, Test};
pub use query::{build_select, build_where_clause, SqlParam};

/// Parse and compile a search string for entity type `E`.
pub fn compile_search<E: Filterable>(search: Option<&str>) -> crate::Result<CompiledPredicate<E>> {
    let criteria = parse_search(search)?;
    compile(&criteria)
}

//! Field metadata for filterable entities.
//!
//! Every entity that can be searched publishes a static table of
//! [`FieldDef`] entries keyed by attribute name. Each entry carries the
//! storage column, a semantic type tag and an accessor, which lets the
//! predicate compiler address any attribute by name without reflection.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::{Result, TaskManagerError};

/// Semantic type of an entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, matched by substring under `:`
    Text,
    /// 64-bit signed integer
    Integer,
    /// Calendar date without time zone
    Date,
    /// Enumeration with its literal member names
    Enum(&'static [&'static str]),
}

impl FieldKind {
    /// Whether `:` means substring containment for this kind.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text)
    }

    /// Whether relational operators are allowed.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, FieldKind::Enum(_))
    }

    /// Human readable type name used in coercion errors.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Date => "ISO-8601 date",
            FieldKind::Enum(_) => "enumeration member",
        }
    }
}

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Enum(&'static str),
}

impl FieldValue {
    /// Compare two values of the same kind.
    ///
    /// Returns `None` for mismatched kinds and for enumerations, which carry
    /// no ordering.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Enum(name) => f.write_str(name),
        }
    }
}

/// Metadata for one filterable attribute of `E`.
pub struct FieldDef<E> {
    /// Attribute name used in search strings
    pub name: &'static str,
    /// Storage column holding the attribute
    pub column: &'static str,
    pub kind: FieldKind,
    /// Read the attribute from an entity; `None` when the value is absent
    pub accessor: fn(&E) -> Option<FieldValue>,
}

impl<E> FieldDef<E> {
    /// Read this attribute from an entity.
    pub fn get(&self, entity: &E) -> Option<FieldValue> {
        (self.accessor)(entity)
    }

    /// Convert a raw search literal into this attribute's type.
    pub fn coerce(&self, raw: &str) -> Result<FieldValue> {
        let failed = || TaskManagerError::TypeCoercion {
            field: self.name.to_string(),
            value: raw.to_string(),
            expected: self.kind.name(),
        };

        match self.kind {
            FieldKind::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| failed()),
            FieldKind::Date => parse_date(raw).map(FieldValue::Date).ok_or_else(failed),
            FieldKind::Enum(members) => members
                .iter()
                .copied()
                .find(|member| *member == raw)
                .map(FieldValue::Enum)
                .ok_or_else(failed),
        }
    }
}

impl<E> fmt::Debug for FieldDef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Entity with a field-metadata table.
pub trait Filterable: Sized + 'static {
    /// Table holding the entity rows.
    const TABLE: &'static str;

    /// All filterable attributes.
    fn fields() -> &'static [FieldDef<Self>];

    /// Look up an attribute by its exact name.
    fn field(name: &str) -> Result<&'static FieldDef<Self>> {
        Self::fields()
            .iter()
            .find(|def| def.name == name)
            .ok_or_else(|| TaskManagerError::UnknownAttribute {
                field: name.to_string(),
            })
    }
}

/// Parse an ISO-8601 calendar date in extended (`2024-01-31`) or basic
/// (`20240131`) form.
///
/// Search values cannot contain `-`, so the basic form is the one reachable
/// from a search string.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
                NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
            } else {
                None
            }
        })
}

//! BSON type aliases for `$type`
//!
//! Maps BSON numeric codes and string aliases onto the value model. Several
//! BSON types without a native counterpart (objectId, date, regex,
//! javascript) are represented as strings.

use super::error::QueryError;
use crate::document::Value;

/// Value category selected by a `$type` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Double,
    String,
    Object,
    Array,
    Binary,
    Bool,
    Null,
    /// Int32 or Int64
    Integer,
    /// Any numeric value (alias `"number"`)
    Number,
}

impl TypeCategory {
    /// Check if a value belongs to this category
    pub fn matches(self, value: &Value) -> bool {
        match self {
            TypeCategory::Double => matches!(value, Value::Float64(_)),
            TypeCategory::String => matches!(value, Value::String(_)),
            TypeCategory::Object => matches!(value, Value::Object(_)),
            TypeCategory::Array => matches!(value, Value::Array(_)),
            TypeCategory::Binary => matches!(value, Value::Binary(_)),
            TypeCategory::Bool => matches!(value, Value::Bool(_)),
            TypeCategory::Null => matches!(value, Value::Null),
            TypeCategory::Integer => value.is_integer(),
            TypeCategory::Number => value.is_number(),
        }
    }
}

/// BSON alias table: (alias, code, category)
const BSON_TYPES: &[(&str, i64, TypeCategory)] = &[
    ("double", 1, TypeCategory::Double),
    ("string", 2, TypeCategory::String),
    ("object", 3, TypeCategory::Object),
    ("array", 4, TypeCategory::Array),
    ("binData", 5, TypeCategory::Binary),
    ("objectId", 7, TypeCategory::String),
    ("bool", 8, TypeCategory::Bool),
    ("date", 9, TypeCategory::String),
    ("null", 10, TypeCategory::Null),
    ("regex", 11, TypeCategory::String),
    ("javascript", 13, TypeCategory::String),
    ("javascriptWithScope", 15, TypeCategory::String),
    ("int", 16, TypeCategory::Integer),
    ("timestamp", 17, TypeCategory::Integer),
    ("long", 18, TypeCategory::Integer),
];

/// Resolve a `$type` argument (code or alias) to a category
pub fn resolve_type(condition: &Value) -> Result<TypeCategory, QueryError> {
    let found = match condition {
        Value::String(alias) if alias == "number" => Some(TypeCategory::Number),
        Value::String(alias) => BSON_TYPES
            .iter()
            .find(|(name, _, _)| *name == alias.as_str())
            .map(|(_, _, category)| *category),
        Value::Int32(_) | Value::Int64(_) | Value::Float64(_) => code_of(condition).and_then(|code| {
            BSON_TYPES
                .iter()
                .find(|(_, c, _)| *c == code)
                .map(|(_, _, category)| *category)
        }),
        _ => None,
    };

    found.ok_or_else(|| {
        QueryError::invalid_argument("$type", format!("unknown BSON type {}", condition))
    })
}

fn code_of(condition: &Value) -> Option<i64> {
    match condition {
        Value::Float64(f) if f.fract() == 0.0 => Some(*f as i64),
        other => other.as_i64(),
    }
}

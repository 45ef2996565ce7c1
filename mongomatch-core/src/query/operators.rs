//! Operator table
//!
//! Every supported `$` operator is a variant of [`Operator`]. Names that are
//! not in the table, including the deliberately unsupported `$text`, `$where`
//! and `$options`, are rejected by [`Operator::from_name`].
//!
//! Non-recursive handlers live here; handlers that evaluate sub-definitions
//! are implemented by the matcher.

use super::error::QueryError;
use super::path::Resolved;
use super::types::resolve_type;
use crate::document::Value;
use std::cmp::Ordering;

/// Operator families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    Comparison,
    Logical,
    Element,
    Evaluation,
    Array,
}

/// Supported query operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    And,
    Or,
    Nor,
    Not,
    Exists,
    Type,
    Mod,
    Regex,
    Comment,
    All,
    ElemMatch,
    Size,
}

impl Operator {
    /// All operators, in table order
    pub const ALL: [Operator; 20] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::Nin,
        Operator::And,
        Operator::Or,
        Operator::Nor,
        Operator::Not,
        Operator::Exists,
        Operator::Type,
        Operator::Mod,
        Operator::Regex,
        Operator::Comment,
        Operator::All,
        Operator::ElemMatch,
        Operator::Size,
    ];

    /// Look up an operator by its `$`-prefixed name
    pub fn from_name(name: &str) -> Result<Self, QueryError> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| QueryError::UnsupportedOperator(name.to_string()))
    }

    /// The `$`-prefixed name
    pub fn name(self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::In => "$in",
            Operator::Nin => "$nin",
            Operator::And => "$and",
            Operator::Or => "$or",
            Operator::Nor => "$nor",
            Operator::Not => "$not",
            Operator::Exists => "$exists",
            Operator::Type => "$type",
            Operator::Mod => "$mod",
            Operator::Regex => "$regex",
            Operator::Comment => "$comment",
            Operator::All => "$all",
            Operator::ElemMatch => "$elemMatch",
            Operator::Size => "$size",
        }
    }

    pub fn family(self) -> OperatorFamily {
        match self {
            Operator::Eq
            | Operator::Ne
            | Operator::Gt
            | Operator::Gte
            | Operator::Lt
            | Operator::Lte
            | Operator::In
            | Operator::Nin => OperatorFamily::Comparison,
            Operator::And | Operator::Or | Operator::Nor | Operator::Not => OperatorFamily::Logical,
            Operator::Exists | Operator::Type => OperatorFamily::Element,
            Operator::Mod | Operator::Regex | Operator::Comment => OperatorFamily::Evaluation,
            Operator::All | Operator::ElemMatch | Operator::Size => OperatorFamily::Array,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Literal condition: equality, or membership when the target is list-like
pub fn literal_match(condition: &Value, target: &Resolved<'_>) -> bool {
    if target.list_len().is_some() {
        target.contains(condition) || target.equals(condition)
    } else {
        target.equals(condition)
    }
}

/// `$ne`
pub fn not_equal(condition: &Value, target: &Resolved<'_>) -> bool {
    !target.equals(condition)
}

/// `$gt`, `$gte`, `$lt`, `$lte`; incomparable types never match
pub fn ordered(op: Operator, condition: &Value, target: &Resolved<'_>) -> bool {
    let Some(ord) = target.compare(condition) else {
        return false;
    };
    match op {
        Operator::Gt => ord == Ordering::Greater,
        Operator::Gte => ord != Ordering::Less,
        Operator::Lt => ord == Ordering::Less,
        Operator::Lte => ord != Ordering::Greater,
        _ => false,
    }
}

/// `$in`: any candidate equals the target or is contained in it
pub fn in_list(op: Operator, condition: &Value, target: &Resolved<'_>) -> Result<bool, QueryError> {
    let candidates = condition.as_array().ok_or_else(|| {
        QueryError::invalid_argument(op.name(), format!("expected an array, got {}", condition.type_name()))
    })?;
    let list_like = target.list_len().is_some();

    Ok(candidates.iter().any(|candidate| {
        if list_like {
            target.contains(candidate)
        } else {
            target.equals(candidate)
        }
    }))
}

/// `$type`
pub fn type_match(condition: &Value, target: &Resolved<'_>) -> Result<bool, QueryError> {
    let category = resolve_type(condition)?;
    Ok(target.as_value().map_or(false, |value| category.matches(value)))
}

/// `$mod`: `[divisor, remainder]`, floored modulo (result takes the divisor's sign)
pub fn modulo(condition: &Value, target: &Resolved<'_>) -> Result<bool, QueryError> {
    let (divisor, remainder) = match condition.as_array().map(Vec::as_slice) {
        Some([divisor, remainder]) if divisor.is_number() && remainder.is_number() => {
            (divisor, remainder)
        }
        _ => {
            return Err(QueryError::invalid_argument(
                "$mod",
                format!("expected [divisor, remainder], got {}", condition),
            ))
        }
    };
    if divisor.as_f64() == Some(0.0) {
        return Err(QueryError::invalid_argument("$mod", "divisor cannot be 0"));
    }

    let Some(value) = target.as_value().filter(|v| v.is_number()) else {
        return Ok(false);
    };

    let result = match (value.as_i64(), divisor.as_i64()) {
        (Some(a), Some(b)) => match a.checked_rem(b) {
            Some(r) if r != 0 && (r < 0) != (b < 0) => Value::Int64(r + b),
            Some(r) => Value::Int64(r),
            None => Value::Int64(0),
        },
        _ => {
            let (a, b) = match (value.as_f64(), divisor.as_f64()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Ok(false),
            };
            Value::Float64(a - b * (a / b).floor())
        }
    };

    Ok(result == *remainder)
}

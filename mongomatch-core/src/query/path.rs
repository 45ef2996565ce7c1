//! Path resolution
//!
//! Resolves dotted field paths (`"memos.1.memo"`) against a document. When a
//! segment meets a list and is not an index, the remaining path is applied to
//! every element and the results are collected ("fan-out").

use crate::document::{Key, Value};
use std::cmp::Ordering;

/// Result of resolving a path against a document
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// The path did not resolve to anything (distinct from an explicit null)
    Missing,
    /// A value borrowed from the document
    Found(&'a Value),
    /// One result per list element, produced by fan-out
    Fanned(Vec<Resolved<'a>>),
}

impl<'a> Resolved<'a> {
    /// Check if this is the undefined marker
    pub fn is_missing(&self) -> bool {
        matches!(self, Resolved::Missing)
    }

    /// The borrowed value, if this resolved to a single value
    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            Resolved::Found(v) => Some(v),
            _ => None,
        }
    }

    /// Elements when list-like (a document array or a fan-out result)
    pub fn elements(&self) -> Option<Vec<Resolved<'a>>> {
        match self {
            Resolved::Found(Value::Array(arr)) => Some(arr.iter().map(Resolved::Found).collect()),
            Resolved::Fanned(items) => Some(items.clone()),
            _ => None,
        }
    }

    /// Length when list-like
    pub fn list_len(&self) -> Option<usize> {
        match self {
            Resolved::Found(Value::Array(arr)) => Some(arr.len()),
            Resolved::Fanned(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Structural equality against a definition value. Missing equals nothing.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Resolved::Missing, _) => false,
            (Resolved::Found(v), _) => *v == other,
            (Resolved::Fanned(items), Value::Array(arr)) => {
                items.len() == arr.len() && items.iter().zip(arr).all(|(i, v)| i.equals(v))
            }
            (Resolved::Fanned(_), _) => false,
        }
    }

    /// Membership test for list-like targets
    pub fn contains(&self, needle: &Value) -> bool {
        match self {
            Resolved::Found(Value::Array(arr)) => arr.iter().any(|v| v == needle),
            Resolved::Fanned(items) => items.iter().any(|i| i.equals(needle)),
            _ => false,
        }
    }

    /// Ordering against a definition value, `None` when not comparable
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Resolved::Missing, _) => None,
            (Resolved::Found(v), _) => v.compare(other),
            (Resolved::Fanned(items), Value::Array(arr)) => {
                for (x, y) in items.iter().zip(arr) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(items.len().cmp(&arr.len()))
            }
            (Resolved::Fanned(_), _) => None,
        }
    }
}

/// Split a dotted path into segments
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// Check if a segment is a list index (non-empty, ASCII digits only)
pub(crate) fn is_index_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Extract the value(s) at `path` from `target`.
///
/// A null value swallows any remaining path and stays null. Scalars with
/// remaining segments resolve to `Missing`; strings are never iterated.
pub fn extract<'a>(target: &Resolved<'a>, path: &[&str]) -> Resolved<'a> {
    let Some((segment, rest)) = path.split_first() else {
        return target.clone();
    };

    match target {
        Resolved::Missing => Resolved::Missing,
        Resolved::Found(Value::Null) => target.clone(),
        Resolved::Found(Value::Object(obj)) => match obj.get(&Key::String(segment.to_string())) {
            Some(child) => extract(&Resolved::Found(child), rest),
            None => Resolved::Missing,
        },
        _ => match target.elements() {
            Some(elements) if is_index_segment(segment) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| elements.get(index))
                .map_or(Resolved::Missing, |element| extract(element, rest)),
            Some(elements) => Resolved::Fanned(
                elements.iter().map(|element| extract(element, path)).collect(),
            ),
            None => Resolved::Missing,
        },
    }
}

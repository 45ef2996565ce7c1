//! Existence checks for `$exists` on dotted paths
//!
//! Unlike extraction, this walk answers the `$exists` question directly: it
//! returns the match result for the expected polarity, reporting
//! `!expected` as soon as a segment fails to resolve.

use super::path::{is_index_segment, Resolved};
use crate::document::{Key, Value};

/// Evaluate `{path: {"$exists": expected}}` against `target`
pub fn path_exists(path: &str, expected: bool, target: &Resolved<'_>) -> bool {
    let segments: Vec<&str> = path.split('.').collect();
    segments_exist(&segments, expected, target)
}

/// Segment-wise walk behind [`path_exists`]
pub(crate) fn segments_exist(segments: &[&str], expected: bool, target: &Resolved<'_>) -> bool {
    let mut current = target.clone();

    for (i, segment) in segments.iter().enumerate() {
        if let Some(elements) = current.elements() {
            if !is_index_segment(segment) {
                let remaining = &segments[i..];
                for element in &elements {
                    if segments_exist(remaining, expected, element) == expected {
                        return expected;
                    }
                }
                return !expected;
            }

            current = match segment.parse::<usize>().ok().and_then(|idx| elements.get(idx)) {
                Some(element) => element.clone(),
                None => return !expected,
            };
            continue;
        }

        current = match current {
            Resolved::Found(Value::Object(obj)) => match obj.get(&Key::String(segment.to_string())) {
                Some(child) => Resolved::Found(child),
                None => return !expected,
            },
            _ => return !expected,
        };
    }

    expected
}

//! Regex compilation for `$regex`
//!
//! Accepts either the delimited form `/expr/flags` (flags from `i`, `m`, `s`,
//! `x`, at most four) or a bare pattern without flags.

use super::error::QueryError;
use crate::document::Value;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;

const MAX_FLAGS: usize = 4;

/// Inline flags of a delimited pattern
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    /// `i`
    pub case_insensitive: bool,
    /// `m`: `^`/`$` match at line boundaries
    pub multi_line: bool,
    /// `s`: `.` matches newlines
    pub dot_all: bool,
    /// `x`: whitespace and `#` comments are ignored
    pub extended: bool,
}

impl RegexFlags {
    fn parse(flags: &str) -> Option<Self> {
        if flags.len() > MAX_FLAGS {
            return None;
        }
        let mut parsed = Self::default();
        for flag in flags.chars() {
            match flag {
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'x' => parsed.extended = true,
                _ => return None,
            }
        }
        Some(parsed)
    }
}

/// Split a `$regex` argument into pattern and flags.
///
/// Strings that are not in the delimited form are returned whole.
pub fn split_delimited(raw: &str) -> (&str, RegexFlags) {
    if let Some(body) = raw.strip_prefix('/') {
        if let Some(end) = body.rfind('/') {
            if let Some(flags) = RegexFlags::parse(&body[end + 1..]) {
                return (&body[..end], flags);
            }
        }
    }
    (raw, RegexFlags::default())
}

/// Let a trailing `$` also match before a final newline.
///
/// Only applies outside multi-line mode, where `$` otherwise means the very
/// end of the text. Escaped dollars (`\$`) are left alone.
fn anchor_before_final_newline(pattern: &str, flags: RegexFlags) -> Cow<'_, str> {
    if flags.multi_line {
        return Cow::Borrowed(pattern);
    }
    let body = if flags.extended {
        pattern.trim_end()
    } else {
        pattern
    };
    let Some(head) = body.strip_suffix('$') else {
        return Cow::Borrowed(pattern);
    };
    let escapes = head.bytes().rev().take_while(|&b| b == b'\\').count();
    if escapes % 2 == 1 {
        return Cow::Borrowed(pattern);
    }
    Cow::Owned(format!("{}\\n?$", head))
}

/// Compile a `$regex` argument
pub fn compile_pattern(condition: &Value, size_limit: usize) -> Result<Regex, QueryError> {
    let raw = condition.as_str().ok_or_else(|| {
        QueryError::invalid_argument(
            "$regex",
            format!("expected a string, got {}", condition.type_name()),
        )
    })?;

    let (pattern, flags) = split_delimited(raw);
    let pattern = anchor_before_final_newline(pattern, flags);

    RegexBuilder::new(&pattern)
        .case_insensitive(flags.case_insensitive)
        .multi_line(flags.multi_line)
        .dot_matches_new_line(flags.dot_all)
        .ignore_whitespace(flags.extended)
        .size_limit(size_limit)
        .build()
        .map_err(|e| QueryError::InvalidRegex(format!("{}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1 << 20;

    fn compile(raw: &str) -> Regex {
        compile_pattern(&Value::from(raw), LIMIT).unwrap()
    }

    #[test]
    fn test_split_delimited() {
        let (pattern, flags) = split_delimited("/^ABC/i");
        assert_eq!(pattern, "^ABC");
        assert!(flags.case_insensitive);
        assert!(!flags.multi_line);

        let (pattern, flags) = split_delimited("/m.*line/si");
        assert_eq!(pattern, "m.*line");
        assert!(flags.dot_all && flags.case_insensitive);

        // unknown flag: not the delimited form
        let (pattern, flags) = split_delimited("/abc/q");
        assert_eq!(pattern, "/abc/q");
        assert_eq!(flags, RegexFlags::default());

        let (pattern, _) = split_delimited("^abc");
        assert_eq!(pattern, "^abc");

        let (pattern, _) = split_delimited("/a/b/");
        assert_eq!(pattern, "a/b");
    }

    #[test]
    fn test_bare_pattern_searches() {
        let re = compile("^abc");
        assert!(re.is_match("abc123"));
        assert!(!re.is_match("ABC123"));
        assert!(compile("b1").is_match("abc123"));
    }

    #[test]
    fn test_flags_apply() {
        assert!(compile("/^ABC/i").is_match("abc789"));
        assert!(compile("/^S/m").is_match("First line\nSecond line"));
        assert!(!compile("/^S/").is_match("First line\nSecond line"));
        assert!(compile("/m.*line/si").is_match("Multiple\nline description"));
        assert!(!compile("/m.*line/i").is_match("Multiple\nline description"));
    }

    #[test]
    fn test_extended_flag_ignores_whitespace_and_comments() {
        let raw = "/\n        abc #category code\n        123 #item number\n        /x";
        let re = compile(raw);
        assert!(re.is_match("abc123"));
        assert!(!re.is_match("abc789"));
    }

    #[test]
    fn test_trailing_dollar_matches_before_final_newline() {
        assert!(compile("abc$").is_match("abc\n"));
        assert!(compile("abc$").is_match("abc"));
        assert!(!compile("abc$").is_match("abc\n\n"));
        assert!(!compile("abc$").is_match("abc\nd"));
        assert!(compile("/^abc$/i").is_match("ABC\n"));
        assert!(compile("/abc $\n/x").is_match("abc\n"));

        // escaped dollar is a literal
        assert!(compile(r"cost\$").is_match("cost$"));
        assert!(!compile(r"cost\$").is_match("cost\n"));

        // multi-line mode keeps its own line anchors
        assert!(compile("/^a$/m").is_match("x\na\ny"));
    }

    #[test]
    fn test_invalid_pattern_is_query_error() {
        let err = compile_pattern(&Value::from("/(unclosed/"), LIMIT).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRegex(_)));
    }

    #[test]
    fn test_non_string_argument() {
        let err = compile_pattern(&Value::Int32(5), LIMIT).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument { .. }));
    }
}

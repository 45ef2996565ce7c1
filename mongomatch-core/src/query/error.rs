//! Query errors
//!
//! Structural misuse of the query language is reported through `QueryError`.
//! Type mismatches during evaluation are not errors: they resolve to "no match".

/// Errors raised while evaluating a query definition
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid argument for {operator}: {reason}")]
    InvalidArgument { operator: String, reason: String },

    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),

    #[error("Query nesting too deep: {depth} levels (max: {max})")]
    NestingTooDeep { depth: usize, max: usize },
}

impl QueryError {
    /// Create an invalid-argument error for an operator
    pub fn invalid_argument(operator: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::UnsupportedOperator("$bogus".to_string());
        assert_eq!(err.to_string(), "Unsupported operator: $bogus");

        let err = QueryError::invalid_argument("$size", "expected an integer, got string");
        assert_eq!(
            err.to_string(),
            "Invalid argument for $size: expected an integer, got string"
        );

        let err = QueryError::NestingTooDeep { depth: 101, max: 100 };
        assert!(err.to_string().contains("max: 100"));
    }
}

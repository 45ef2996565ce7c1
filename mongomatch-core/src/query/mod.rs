//! Query matching for mongomatch
//!
//! This module provides MongoDB-style query evaluation against in-memory
//! documents. A [`QueryMatcher`] owns one definition and is evaluated
//! against any number of documents.

pub mod error;
pub mod exists;
pub mod matcher;
pub mod operators;
pub mod path;
pub mod pattern;
pub mod types;

pub use error::QueryError;
pub use matcher::QueryMatcher;
pub use operators::{Operator, OperatorFamily};
pub use path::{extract, split_path, Resolved};
pub use types::TypeCategory;

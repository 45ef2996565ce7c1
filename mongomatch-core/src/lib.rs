//! Mongomatch Core - MongoDB-style query matching over in-memory documents
//!
//! This crate provides:
//! - A dynamic document model with integer and string keys
//! - Dotted path resolution with list fan-out
//! - The query matcher and its operator table
//! - Matcher configuration and structured logging setup

pub mod config;
pub mod document;
pub mod logging;
pub mod query;

pub use config::MatcherConfig;
pub use document::{Key, Value};
pub use logging::{init_logging, FilterTimer, LoggingConfig};
pub use query::{Operator, QueryError, QueryMatcher, Resolved};

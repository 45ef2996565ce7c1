//! Query matcher for evaluating definitions against documents
//!
//! Walks a query definition recursively: field paths are resolved through
//! [`extract`], `$` operators are dispatched through [`Operator`], and
//! everything else is a literal comparison.

use super::error::QueryError;
use super::exists::{path_exists, segments_exist};
use super::operators::{
    in_list, literal_match, modulo, not_equal, ordered, type_match, Operator,
};
use super::path::{extract, split_path, Resolved};
use super::pattern::compile_pattern;
use crate::config::MatcherConfig;
use crate::document::{Key, Value};
use tracing::{debug, trace};

const EXISTS: &str = "$exists";

/// Evaluates one query definition against any number of documents
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    definition: Value,
    config: MatcherConfig,
}

impl QueryMatcher {
    /// Create a matcher with the default configuration.
    ///
    /// The definition is not validated here; malformed operators are
    /// reported when a document is evaluated.
    pub fn new(definition: Value) -> Self {
        Self::with_config(definition, MatcherConfig::default())
    }

    /// Create a matcher with an explicit configuration
    pub fn with_config(definition: Value, config: MatcherConfig) -> Self {
        Self { definition, config }
    }

    /// The query definition
    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// The matcher configuration
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Check if a document matches the definition
    pub fn matches(&self, document: &Value) -> Result<bool, QueryError> {
        let result = self.match_condition(&self.definition, &Resolved::Found(document), 0);
        if let Err(e) = &result {
            debug!(error = %e, "Query evaluation failed");
        }
        result
    }

    /// Keep the matching documents, in their original order.
    ///
    /// Stops at the first query error.
    pub fn filter<'d, I>(&self, documents: I) -> Result<Vec<&'d Value>, QueryError>
    where
        I: IntoIterator<Item = &'d Value>,
    {
        let timer = crate::logging::FilterTimer::start(self.config.slow_filter_threshold_ms);
        let mut matched = Vec::new();
        let mut scanned = 0;

        for document in documents {
            scanned += 1;
            if self.matches(document)? {
                matched.push(document);
            }
        }

        timer.finish(scanned, matched.len());
        Ok(matched)
    }

    fn check_depth(&self, depth: usize) -> Result<(), QueryError> {
        if depth > self.config.max_depth {
            return Err(QueryError::NestingTooDeep {
                depth,
                max: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn match_condition(
        &self,
        condition: &Value,
        target: &Resolved<'_>,
        depth: usize,
    ) -> Result<bool, QueryError> {
        self.check_depth(depth)?;

        match condition {
            Value::Object(pairs) => {
                for (key, sub_condition) in pairs {
                    if !self.process_condition(key, sub_condition, target, depth)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            _ => Ok(literal_match(condition, target)),
        }
    }

    fn process_condition(
        &self,
        key: &Key,
        condition: &Value,
        target: &Resolved<'_>,
        depth: usize,
    ) -> Result<bool, QueryError> {
        // $elemMatch enters here directly, so the guard is repeated
        self.check_depth(depth)?;

        if !key.is_operator() {
            if let Some(expected) = condition.get(&Key::from(EXISTS)) {
                let expected = expected.is_truthy();
                match key {
                    Key::String(path) if path.contains('.') => {
                        return Ok(path_exists(path, expected, target));
                    }
                    _ => {
                        if key_present(key, target) != expected {
                            return Ok(false);
                        }
                        if condition.as_object().map_or(false, |c| c.len() == 1) {
                            return Ok(true);
                        }
                    }
                }
            }
        }

        match key {
            Key::String(name) if name.starts_with('$') => {
                let op = Operator::from_name(name)?;
                trace!(operator = %op, family = ?op.family(), "Dispatching operator");
                self.apply_operator(op, condition, target, depth)
            }
            Key::String(path) => {
                let extracted = extract(target, &split_path(path));
                self.match_condition(condition, &extracted, depth + 1)
            }
            Key::Int(_) => match target.as_value().and_then(|value| value.get(key)) {
                Some(value) => self.match_condition(condition, &Resolved::Found(value), depth + 1),
                None => Ok(false),
            },
        }
    }

    fn apply_operator(
        &self,
        op: Operator,
        condition: &Value,
        target: &Resolved<'_>,
        depth: usize,
    ) -> Result<bool, QueryError> {
        match op {
            Operator::Eq => Ok(literal_match(condition, target)),
            Operator::Ne => Ok(not_equal(condition, target)),
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                Ok(ordered(op, condition, target))
            }
            Operator::In => in_list(op, condition, target),
            Operator::Nin => in_list(op, condition, target).map(|found| !found),
            Operator::And | Operator::Or | Operator::Nor => {
                self.logical(op, condition, target, depth)
            }
            Operator::Not => self
                .match_condition(condition, target, depth + 1)
                .map(|matched| !matched),
            // $exists is resolved before dispatch; here it is a lone leaf
            Operator::Exists | Operator::Comment => Ok(true),
            Operator::Type => type_match(condition, target),
            Operator::Mod => modulo(condition, target),
            Operator::Regex => self.regex(condition, target),
            Operator::All => self.all(condition, target, depth),
            Operator::ElemMatch => self.elem_match(condition, target, depth),
            Operator::Size => self.size(condition, target, depth),
        }
    }

    /// `$and`, `$or`, `$nor`
    fn logical(
        &self,
        op: Operator,
        condition: &Value,
        target: &Resolved<'_>,
        depth: usize,
    ) -> Result<bool, QueryError> {
        let definitions = condition.as_array().ok_or_else(|| {
            QueryError::invalid_argument(
                op.name(),
                format!("expected an array of definitions, got {}", condition.type_name()),
            )
        })?;

        for definition in definitions {
            let matched = self.match_condition(definition, target, depth + 1)?;
            match (op, matched) {
                (Operator::And, false) => return Ok(false),
                (Operator::Or, true) => return Ok(true),
                (Operator::Nor, true) => return Ok(false),
                _ => {}
            }
        }

        Ok(op != Operator::Or)
    }

    fn regex(&self, condition: &Value, target: &Resolved<'_>) -> Result<bool, QueryError> {
        let regex = compile_pattern(condition, self.config.regex_size_limit)?;
        Ok(match target.as_value() {
            Some(Value::String(s)) => regex.is_match(s),
            _ => false,
        })
    }

    /// `$all`: every element must match the target on its own
    fn all(&self, condition: &Value, target: &Resolved<'_>, depth: usize) -> Result<bool, QueryError> {
        let definitions = condition.as_array().ok_or_else(|| {
            QueryError::invalid_argument(
                "$all",
                format!("expected an array, got {}", condition.type_name()),
            )
        })?;

        for definition in definitions {
            if !self.match_condition(definition, target, depth + 1)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// `$elemMatch`: a single element must satisfy every pair
    fn elem_match(
        &self,
        condition: &Value,
        target: &Resolved<'_>,
        depth: usize,
    ) -> Result<bool, QueryError> {
        let pairs = condition.as_object().ok_or_else(|| {
            QueryError::invalid_argument(
                "$elemMatch",
                format!("expected an object, got {}", condition.type_name()),
            )
        })?;
        let Some(elements) = target.elements() else {
            return Ok(false);
        };

        'elements: for element in &elements {
            for (key, sub_condition) in pairs {
                if !self.process_condition(key, sub_condition, element, depth + 1)? {
                    continue 'elements;
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// `$size`: an exact length, or a definition matched against the length
    fn size(&self, condition: &Value, target: &Resolved<'_>, depth: usize) -> Result<bool, QueryError> {
        match condition {
            Value::Int32(_) | Value::Int64(_) => Ok(target
                .list_len()
                .map_or(false, |len| i64::try_from(len).ok() == condition.as_i64())),
            Value::Object(_) => match target.list_len() {
                Some(len) => {
                    let length = Value::from(len);
                    self.match_condition(condition, &Resolved::Found(&length), depth + 1)
                }
                None => Ok(false),
            },
            _ => Err(QueryError::invalid_argument(
                "$size",
                format!("expected an integer, got {}", condition.type_name()),
            )),
        }
    }
}

/// Presence of a single (non-dotted) key in the target
fn key_present(key: &Key, target: &Resolved<'_>) -> bool {
    match key {
        Key::String(name) => segments_exist(&[name.as_str()], true, target),
        Key::Int(_) => target.as_value().and_then(|value| value.get(key)).is_some(),
    }
}

//! Document and Value types for mongomatch
//!
//! This module provides the dynamic value model shared by documents and query
//! definitions:
//! - Value: a closed tagged union over JSON-like data plus binary payloads
//! - Key: object keys, either strings or integer literals
//! - Conversion from `serde_json::Value`
//! - Serde support using the plain JSON shape (no type tags)

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Object key: a string field name or an integer literal key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Integer literal key (e.g. `{1: "foo"}` in YAML)
    Int(i64),
    /// String key, possibly a dotted path or a `$` operator in definitions
    String(String),
}

impl Key {
    /// Get the string form, if this is a string key
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s.as_str()),
            Key::Int(_) => None,
        }
    }

    /// Check if this key names an operator (`$`-prefixed string)
    pub fn is_operator(&self) -> bool {
        matches!(self, Key::String(s) if s.starts_with('$'))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

/// Value type covering everything a parsed JSON/YAML document can hold
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    Int32(i32),
    /// 64-bit integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// String value
    String(String),
    /// Binary data
    Binary(Vec<u8>),
    /// Array of values
    Array(Vec<Value>),
    /// Object with unique keys, iterated in key order
    Object(BTreeMap<Key, Value>),
}

impl Value {
    /// Parse a JSON string into a Value
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Ok(parsed.into())
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is a number (int or float)
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int32(_) | Value::Int64(_) | Value::Float64(_))
    }

    /// Check if value is an integer of either width
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Int32(_) | Value::Int64(_))
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Check if value is an object
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 (integers only, floats are not truncated)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(i) => Some(*i as i64),
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int32(i) => Some(*i as f64),
            Value::Int64(i) => Some(*i as f64),
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get as array reference
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get as object reference
    pub fn as_object(&self) -> Option<&BTreeMap<Key, Value>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Look up a key in an object value
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Truthiness as used by `$exists` arguments
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int32(i) => *i != 0,
            Value::Int64(i) => *i != 0,
            Value::Float64(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Binary(b) => !b.is_empty(),
            Value::Array(arr) => !arr.is_empty(),
            Value::Object(obj) => !obj.is_empty(),
        }
    }

    /// Human-readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int",
            Value::Int64(_) => "long",
            Value::Float64(_) => "double",
            Value::String(_) => "string",
            Value::Binary(_) => "binData",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Ordering between two values, `None` when the types are not comparable.
    ///
    /// Numbers compare across widths; strings, booleans and binaries compare
    /// with their own kind; arrays compare lexicographically.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Binary(a), Value::Binary(b)) => Some(a.cmp(b)),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            (a, b) if a.is_number() && b.is_number() => compare_numbers(a, b),
            _ => None,
        }
    }
}

/// Compare two numeric values without rounding integers through `f64`
fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Float64(x), Value::Float64(y)) => x.partial_cmp(y),
        (Value::Float64(x), other) => Some(compare_int_float(other.as_i64()?, *x)?.reverse()),
        (other, Value::Float64(y)) => compare_int_float(other.as_i64()?, *y),
        _ => Some(a.as_i64()?.cmp(&b.as_i64()?)),
    }
}

/// Exact ordering of an integer against a float; `None` for NaN
fn compare_int_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    // 2^63 is exactly representable; every float at or above it exceeds i64::MAX
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f >= I64_BOUND {
        return Some(Ordering::Less);
    }
    if f < -I64_BOUND {
        return Some(Ordering::Greater);
    }

    let whole = f.floor();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal if f > whole => Some(Ordering::Less),
        ord => Some(ord),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (a, b) if a.is_number() && b.is_number() => {
                compare_numbers(a, b) == Some(Ordering::Equal)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float64(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Object(obj) => {
                write!(f, "{{")?;
                for (i, (k, v)) in obj.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k.to_string(), v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Key::Int(i) => serializer.serialize_i64(*i),
            Key::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int32(i) => serializer.serialize_i32(*i),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Float64(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Binary(b) => serializer.serialize_bytes(b),
            Value::Array(arr) => serializer.collect_seq(arr),
            Value::Object(obj) => serializer.collect_map(obj),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON-like value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, i: i64) -> Result<Value, E> {
        Ok(match i32::try_from(i) {
            Ok(small) => Value::Int32(small),
            Err(_) => Value::Int64(i),
        })
    }

    fn visit_u64<E: de::Error>(self, u: u64) -> Result<Value, E> {
        match i64::try_from(u) {
            Ok(i) => self.visit_i64(i),
            Err(_) => Ok(Value::Float64(u as f64)),
        }
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Value, E> {
        Ok(Value::Float64(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_bytes<E: de::Error>(self, b: &[u8]) -> Result<Value, E> {
        Ok(Value::Binary(b.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, b: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Binary(b))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut arr = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            arr.push(item);
        }
        Ok(Value::Array(arr))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut obj = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            obj.insert(Key::String(key), value);
        }
        Ok(Value::Object(obj))
    }
}

/// Deserializes from the plain shape: numbers, strings, arrays and maps
/// become the matching variants, with the same integer narrowing as
/// [`Value::from_json`]. Map keys are always string keys.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::Int32(small),
                        Err(_) => Value::Int64(i),
                    }
                } else {
                    // u64 above i64::MAX and all non-integers land here
                    Value::Float64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (Key::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        match i32::try_from(n) {
            Ok(small) => Value::Int32(small),
            Err(_) => Value::Int64(i64::try_from(n).unwrap_or(i64::MAX)),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<BTreeMap<Key, Value>> for Value {
    fn from(obj: BTreeMap<Key, Value>) -> Self {
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion_preserves_int_float() {
        let v = Value::from(json!({"qty": 25, "price": 2.5, "big": 5_000_000_000i64}));
        assert!(matches!(v.get(&"qty".into()), Some(Value::Int32(25))));
        assert!(matches!(v.get(&"price".into()), Some(Value::Float64(_))));
        assert!(matches!(v.get(&"big".into()), Some(Value::Int64(5_000_000_000))));
    }

    #[test]
    fn test_from_json_str() {
        let v = Value::from_json(r#"{"tags": ["a", "b"], "n": null}"#).unwrap();
        assert_eq!(
            v.get(&"tags".into()).and_then(|t| t.as_array()).map(|a| a.len()),
            Some(2)
        );
        assert!(v.get(&"n".into()).unwrap().is_null());
        assert!(Value::from_json("{not json").is_err());
    }

    #[test]
    fn test_serde_uses_plain_json_shape() {
        let text = r#"{"a":1,"b":[true,null,2.5,"x"],"c":{"d":5000000000}}"#;
        let v = Value::from_json(text).unwrap();

        assert_eq!(serde_json::to_string(&v).unwrap(), text);

        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, v);
        assert!(matches!(parsed.get(&"a".into()), Some(Value::Int32(1))));
    }

    #[test]
    fn test_integer_keys_serialize_as_strings() {
        let v = Value::Object(BTreeMap::from([(Key::Int(1), Value::from("foo"))]));
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"1":"foo"}"#);
    }

    #[test]
    fn test_numeric_equality_across_widths() {
        assert_eq!(Value::Int32(25), Value::Int64(25));
        assert_eq!(Value::Int32(25), Value::Float64(25.0));
        assert_ne!(Value::Int32(25), Value::Float64(25.5));
        assert_ne!(Value::Int32(5), Value::String("5".to_string()));
        assert_ne!(Value::Int32(1), Value::Bool(true));
    }

    #[test]
    fn test_large_integers_compare_exactly_with_floats() {
        let big = Value::Int64(9_007_199_254_740_993);
        let near = Value::Float64(9_007_199_254_740_992.0);

        assert_ne!(big, near);
        assert_eq!(big.compare(&near), Some(Ordering::Greater));
        assert_eq!(near.compare(&big), Some(Ordering::Less));
        assert_eq!(Value::Int64(9_007_199_254_740_992), near);

        assert_eq!(Value::Int32(2).compare(&Value::Float64(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Int32(-3).compare(&Value::Float64(-2.5)), Some(Ordering::Less));
        assert_eq!(Value::Int32(-2).compare(&Value::Float64(-2.5)), Some(Ordering::Greater));
        assert_eq!(Value::Int64(i64::MAX).compare(&Value::Float64(1e19)), Some(Ordering::Less));
        assert_eq!(Value::Int64(i64::MIN).compare(&Value::Float64(-1e19)), Some(Ordering::Greater));
        assert_eq!(Value::Int32(0).compare(&Value::Float64(f64::NAN)), None);
    }

    #[test]
    fn test_compare() {
        assert_eq!(Value::Int32(3).compare(&Value::Float64(2.5)), Some(Ordering::Greater));
        assert_eq!(Value::from("abc").compare(&Value::from("abd")), Some(Ordering::Less));
        assert_eq!(Value::from("abc").compare(&Value::Int32(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);

        let a = Value::from(vec![Value::Int32(1), Value::Int32(2)]);
        let b = Value::from(vec![Value::Int32(1), Value::Int32(3)]);
        assert_eq!(a.compare(&b), Some(Ordering::Less));
    }

    #[test]
    fn test_key_ordering_and_lookup() {
        let mut obj = BTreeMap::new();
        obj.insert(Key::Int(1), Value::from("foo"));
        obj.insert(Key::from("1"), Value::from("bar"));
        let v = Value::Object(obj);

        assert_eq!(v.get(&Key::Int(1)).and_then(|x| x.as_str()), Some("foo"));
        assert_eq!(v.get(&Key::from("1")).and_then(|x| x.as_str()), Some("bar"));
        assert!(Key::from("$gt").is_operator());
        assert!(!Key::Int(3).is_operator());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int32(0).is_truthy());
        assert!(Value::Int32(1).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::Bool(true).is_truthy());
    }
}

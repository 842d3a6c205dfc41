//! # Decoded Value Model
//!
//! Frames decode into dynamically shaped values: numbers, strings, symbols,
//! raw bytes, lists, and insertion-ordered maps. One closed enum keeps the
//! codec tree free of generics while still round-tripping every layout the
//! frame language can describe.
//!
//! Numeric variants are wider than the wire forms on purpose: `Int` carries
//! everything from a single signed byte up to `int64`, `UInt` the unsigned
//! widths, `Float` both float widths. The write path narrows with range
//! checks.

use bytes::Bytes;

use crate::error::CodecError;

/// A decoded (or to-be-encoded) value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed integer (`byte`, `int16`, `int32`, `int64`).
    Int(i64),
    /// Unsigned integer (`uint16`, `uint32`, `uint64`).
    UInt(u64),
    /// Floating point (`float32` widens losslessly into `f64`).
    Float(f64),
    /// Text decoded through a charset codec.
    Str(String),
    /// Symbolic tag: enumeration members and symbolic literals.
    Symbol(String),
    /// Raw bytes from a finite or delimited block.
    Bytes(Bytes),
    /// Fixed-shape or repeated sequence.
    List(Vec<Value>),
    /// Keyed fields in declaration order.
    Map(OrderedMap),
}

impl Value {
    /// Symbol constructor, saving the `to_string` at call sites.
    pub fn symbol(tag: impl Into<String>) -> Self {
        Value::Symbol(tag.into())
    }

    /// String constructor.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Narrow to `i64`, accepting `UInt` values that fit.
    pub fn as_i64(&self) -> Result<i64, CodecError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::UInt(v) => i64::try_from(*v)
                .map_err(|_| CodecError::ShapeMismatch(format!("{} does not fit i64", v))),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected integer, found {:?}",
                other
            ))),
        }
    }

    /// Narrow to `u64`, accepting non-negative `Int` values.
    pub fn as_u64(&self) -> Result<u64, CodecError> {
        match self {
            Value::UInt(v) => Ok(*v),
            Value::Int(v) => u64::try_from(*v).map_err(|_| {
                CodecError::ShapeMismatch(format!("{} does not fit an unsigned field", v))
            }),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected integer, found {:?}",
                other
            ))),
        }
    }

    /// Widen to `f64`; integers are accepted where a float is expected.
    pub fn as_f64(&self) -> Result<f64, CodecError> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::UInt(v) => Ok(*v as f64),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected number, found {:?}",
                other
            ))),
        }
    }

    /// Non-negative length for prefixes and counts.
    pub fn as_len(&self) -> Result<usize, CodecError> {
        let n = self.as_i64()?;
        usize::try_from(n)
            .map_err(|_| CodecError::ShapeMismatch(format!("negative length {}", n)))
    }

    /// Borrow the string content of `Str`.
    pub fn as_str(&self) -> Result<&str, CodecError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected string, found {:?}",
                other
            ))),
        }
    }

    /// Borrow the tag of `Symbol`.
    pub fn as_symbol(&self) -> Result<&str, CodecError> {
        match self {
            Value::Symbol(s) => Ok(s),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected symbol, found {:?}",
                other
            ))),
        }
    }

    /// Borrow the elements of `List`.
    pub fn as_list(&self) -> Result<&[Value], CodecError> {
        match self {
            Value::List(vs) => Ok(vs),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected list, found {:?}",
                other
            ))),
        }
    }

    /// Borrow the fields of `Map`.
    pub fn as_map(&self) -> Result<&OrderedMap, CodecError> {
        match self {
            Value::Map(m) => Ok(m),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected map, found {:?}",
                other
            ))),
        }
    }

    /// Borrow the payload of `Bytes`.
    pub fn as_bytes(&self) -> Result<&Bytes, CodecError> {
        match self {
            Value::Bytes(b) => Ok(b),
            other => Err(CodecError::ShapeMismatch(format!(
                "expected bytes, found {:?}",
                other
            ))),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<OrderedMap> for Value {
    fn from(v: OrderedMap) -> Self {
        Value::Map(v)
    }
}

/// Insertion-ordered string-keyed map.
///
/// Iteration order is insertion order, always. This is the only map
/// constructor the crate offers, so encode order never depends on a host
/// map's hashing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap {
    entries: Vec<(String, Value)>,
}

impl OrderedMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; a repeated key replaces the earlier value in place,
    /// keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for OrderedMap {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_map_preserves_insertion_order() {
        let map: OrderedMap = [("b", Value::Int(1)), ("a", Value::Int(2))]
            .into_iter()
            .collect();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn ordered_map_insert_replaces_in_place() {
        let mut map = OrderedMap::new();
        map.insert("x", Value::Int(1));
        map.insert("y", Value::Int(2));
        map.insert("x", Value::Int(3));
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("x"), Some(&Value::Int(3)));
        assert_eq!(map.keys().next(), Some("x"));
    }

    #[test]
    fn numeric_coercions_are_range_checked() {
        assert_eq!(Value::UInt(7).as_i64().unwrap(), 7);
        assert!(Value::UInt(u64::MAX).as_i64().is_err());
        assert!(Value::Int(-1).as_u64().is_err());
        assert!(Value::Int(-1).as_len().is_err());
        assert_eq!(Value::Int(-2).as_f64().unwrap(), -2.0);
    }
}

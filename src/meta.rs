//! Metadata carried alongside every [`Outcome`](crate::Outcome)
//!
//! Metadata is a small ordered bag of heterogeneous values. Keys are usually
//! names, but index keys are allowed so that list-like data coming from other
//! systems keeps its shape. Values form a recursive sum type, which lets the
//! [`Sanitizer`](crate::sanitize::Sanitizer) walk them exhaustively.
//!
//! # Examples
//!
//! ```
//! use resultflow::meta;
//! use resultflow::meta::{Meta, Value};
//!
//! let base = meta! { "request_id" => "abc", "attempt" => 1 };
//! let merged = base.merged(meta! { "attempt" => 2 });
//!
//! assert_eq!(merged.get("attempt"), Some(&Value::Int(2)));
//! assert_eq!(merged.get("request_id").and_then(Value::as_str), Some("abc"));
//! ```

use std::borrow::Cow;
use std::fmt;

/// A metadata key.
///
/// Only [`Key::Name`] keys take part in sensitive-key matching; index keys are
/// positional and never redacted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// A positional key.
    Index(i64),
    /// A named key.
    Name(String),
}

impl Key {
    /// The key's name, if it is a named key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Index(_) => None,
        }
    }

    fn matches(&self, name: &str) -> bool {
        matches!(self, Key::Name(n) if n == name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<Cow<'_, str>> for Key {
    fn from(name: Cow<'_, str>) -> Self {
        Key::Name(name.into_owned())
    }
}

impl From<i64> for Key {
    fn from(index: i64) -> Self {
        Key::Index(index)
    }
}

impl From<i32> for Key {
    fn from(index: i32) -> Self {
        Key::Index(i64::from(index))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A nested map.
    Map(Meta),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The nested map, if this is a map.
    pub fn as_map(&self) -> Option<&Meta> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The list, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a named entry when this value is a map.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(name))
    }

    /// Short tag describing the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(m) => write!(f, "{}", m),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(Value::Int)
            .unwrap_or(Value::Float(i as f64))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::from(i as u64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(s: Cow<'_, str>) -> Self {
        Value::String(s.into_owned())
    }
}

impl From<Meta> for Value {
    fn from(m: Meta) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Ordered metadata map.
///
/// Lookups ignore insertion order; order is kept only so diagnostics print
/// entries the way they were added. Equality is order-insensitive.
#[derive(Clone, Default)]
pub struct Meta {
    entries: Vec<(Key, Value)>,
}

impl Meta {
    /// Create an empty metadata map.
    pub fn new() -> Self {
        Meta {
            entries: Vec::new(),
        }
    }

    /// Builder-style insert.
    ///
    /// ```
    /// use resultflow::meta::Meta;
    ///
    /// let meta = Meta::new().with("user", "alice").with("retries", 2);
    /// assert_eq!(meta.len(), 2);
    /// ```
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous value for the key.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a named entry.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.matches(name))
            .map(|(_, v)| v)
    }

    /// Look up an entry by any key.
    pub fn get_key(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Mutable lookup of a named entry.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k.matches(name))
            .map(|(_, v)| v)
    }

    /// Remove a named entry.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(k, _)| k.matches(name))?;
        Some(self.entries.remove(pos).1)
    }

    /// Returns true if a named entry exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Shallow merge: every entry of `other` overwrites the same key here.
    pub fn merge(&mut self, other: Meta) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Consuming form of [`Meta::merge`].
    pub fn merged(mut self, other: Meta) -> Self {
        self.merge(other);
        self
    }
}

impl PartialEq for Meta {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get_key(k) == Some(v))
    }
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("}")
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Meta {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Meta::new();
        meta.extend(iter);
        meta
    }
}

impl<K: Into<Key>, V: Into<Value>> Extend<(K, V)> for Meta {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for Meta {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Build a [`Meta`] from `key => value` pairs.
///
/// ```
/// use resultflow::meta;
///
/// let m = meta! { "a" => 1, "b" => "two" };
/// assert_eq!(m.len(), 2);
/// assert!(meta!().is_empty());
/// ```
#[macro_export]
macro_rules! meta {
    () => {
        $crate::meta::Meta::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut m = $crate::meta::Meta::new();
        $( m.insert($key, $value); )+
        m
    }};
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::{Key, Meta, Value};
    use serde::ser::{SerializeMap, SerializeSeq};
    use serde::{Serialize, Serializer};

    impl Serialize for Key {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Key::Index(i) => serializer.serialize_i64(*i),
                Key::Name(name) => serializer.serialize_str(name),
            }
        }
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Null => serializer.serialize_unit(),
                Value::Bool(b) => serializer.serialize_bool(*b),
                Value::Int(i) => serializer.serialize_i64(*i),
                Value::Float(x) => serializer.serialize_f64(*x),
                Value::String(s) => serializer.serialize_str(s),
                Value::List(items) => {
                    let mut seq = serializer.serialize_seq(Some(items.len()))?;
                    for item in items {
                        seq.serialize_element(item)?;
                    }
                    seq.end()
                }
                Value::Map(m) => m.serialize(serializer),
            }
        }
    }

    impl Serialize for Meta {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (k, v) in self.iter() {
                map.serialize_entry(k, v)?;
            }
            map.end()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut m = Meta::new().with("a", 1).with("b", 2);
        let old = m.insert("a", 10);

        assert_eq!(old, Some(Value::Int(1)));
        let keys: Vec<_> = m.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b")]);
        assert_eq!(m.get("a"), Some(&Value::Int(10)));
    }

    #[test]
    fn merge_is_last_write_wins() {
        let merged = meta! { "a" => 1, "b" => 1 }.merged(meta! { "b" => 2, "c" => 3 });

        assert_eq!(merged, meta! { "a" => 1, "b" => 2, "c" => 3 });
    }

    #[test]
    fn equality_ignores_order() {
        assert_eq!(meta! { "a" => 1, "b" => 2 }, meta! { "b" => 2, "a" => 1 });
        assert_ne!(meta! { "a" => 1 }, meta! { "a" => 1, "b" => 2 });
    }

    #[test]
    fn index_and_name_keys_are_distinct() {
        let m = Meta::new().with(123i64, "numeric").with("123", "named");

        assert_eq!(m.len(), 2);
        assert_eq!(m.get("123").and_then(Value::as_str), Some("named"));
        assert_eq!(
            m.get_key(&Key::Index(123)).and_then(Value::as_str),
            Some("numeric")
        );
    }

    #[test]
    fn remove_returns_value() {
        let mut m = meta! { "a" => true };
        assert_eq!(m.remove("a"), Some(Value::Bool(true)));
        assert!(m.is_empty());
        assert_eq!(m.remove("a"), None);
    }

    #[test]
    fn nested_lookup() {
        let m = meta! { "retry" => meta! { "attempts" => 3 } };
        let attempts = m
            .get("retry")
            .and_then(|r| r.get("attempts"))
            .and_then(Value::as_i64);

        assert_eq!(attempts, Some(3));
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::from(u64::MAX).type_name(), "float");
    }

    #[test]
    fn display_renders_nested_structure() {
        let m = meta! { "a" => 1, "b" => vec!["x", "y"] };
        assert_eq!(m.to_string(), "{a: 1, b: [x, y]}");
    }
}

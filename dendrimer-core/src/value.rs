use indexmap::IndexMap;

/// A primitive leaf value carried by an attribute or a document scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Double-precision float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
}

impl Scalar {
    /// Returns the text content if this scalar is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

/// An insertion-ordered map of document entries with unique keys.
pub type ValueMap = IndexMap<String, Value>;

/// A generic self-describing document value.
///
/// Produced fresh by every encode or document load; treated as read-only
/// input during reconciliation. The map variant preserves insertion order,
/// which is the document order the reconciler processes entries in.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Map(ValueMap),
    List(Vec<Value>),
}

impl Value {
    /// Creates an empty map value.
    pub fn empty_map() -> Self {
        Value::Map(ValueMap::new())
    }

    /// Returns the contained map, if this value is a map.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the contained scalar, if this value is a scalar.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained list, if this value is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the display name a document map entry declares for itself,
    /// i.e. the text under the reserved [`NAME_KEY`](crate::node::NAME_KEY)
    /// if present.
    pub fn declared_name(&self) -> Option<&str> {
        self.as_map()?
            .get(crate::node::NAME_KEY)?
            .as_scalar()?
            .as_text()
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(Scalar::Int(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::Text(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(Scalar::Text(v))
    }
}

/// Inserts `(key, value)` into `map`, folding repeated keys into a list.
///
/// - key absent: plain insert;
/// - key already holds a list: append;
/// - key holds anything else: replace with a two-element list of the
///   previous value and the new one.
///
/// A lone entry stays bare, so a one-element list never appears on the
/// wire for a freshly encoded document. Decoding therefore accepts both
/// the bare and the list shape for every key.
pub fn fold(map: &mut ValueMap, key: &str, value: Value) {
    match map.get_mut(key) {
        None => {
            map.insert(key.to_string(), value);
        }
        Some(Value::List(items)) => {
            items.push(value);
        }
        Some(existing) => {
            let previous = std::mem::replace(existing, Value::List(Vec::new()));
            *existing = Value::List(vec![previous, value]);
        }
    }
}

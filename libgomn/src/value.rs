//! GOMN value representation.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A GOMN document: a mapping from key values to values.
///
/// Keys are ordinary [`Value`]s. The grammar never produces a nested
/// document in key position, but every other variant (including arrays)
/// can appear there, so keys are ordered structurally.
pub type Document = BTreeMap<Value, Value>;

/// A GOMN value.
#[derive(Clone)]
pub enum Value {
    /// Null value (`null` or `nil`).
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating-point number.
    Float(f64),
    /// Double-quoted UTF-8 string.
    String(String),
    /// Single-quoted literal, kept as a sequence of scalar values.
    Codepoints(Vec<char>),
    /// Array of values.
    Array(Vec<Value>),
    /// Nested document.
    Document(Document),
    /// Bare word that is not a reserved word.
    Identifier(String),
}

impl Value {
    /// Returns `true` if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float value if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the scalar values if this is a `Codepoints` literal.
    pub fn as_codepoints(&self) -> Option<&[char]> {
        match self {
            Value::Codepoints(cs) => Some(cs),
            _ => None,
        }
    }

    /// Returns a reference to the array if this is an `Array`.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns a reference to the nested document if this is a `Document`.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the bare word if this is an `Identifier`.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Value::Identifier(s) => Some(s),
            _ => None,
        }
    }

    /// Short lowercase name of the variant, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Codepoints(_) => "codepoints",
            Value::Array(_) => "array",
            Value::Document(_) => "document",
            Value::Identifier(_) => "identifier",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::String(_) => 4,
            Value::Codepoints(_) => 5,
            Value::Identifier(_) => 6,
            Value::Array(_) => 7,
            Value::Document(_) => 8,
        }
    }
}

// Floats use the IEEE total order so that every value, including NaN, can
// serve as a document key. Equality follows the same order.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Codepoints(a), Value::Codepoints(b)) => a.cmp(b),
            (Value::Identifier(a), Value::Identifier(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::String(s) | Value::Identifier(s) => s.hash(state),
            Value::Codepoints(cs) => cs.hash(state),
            Value::Array(arr) => arr.hash(state),
            Value::Document(doc) => doc.hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Codepoints(cs) => {
                write!(f, "'")?;
                for c in cs {
                    write!(f, "{}", c.escape_debug())?;
                }
                write!(f, "'")
            }
            Value::Array(arr) => f.debug_list().entries(arr).finish(),
            Value::Document(doc) => f.debug_map().entries(doc).finish(),
            Value::Identifier(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl From<Vec<char>> for Value {
    fn from(cs: Vec<char>) -> Self {
        Value::Codepoints(cs)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_variant_order_is_stable() {
        let mut values = vec![
            Value::Identifier("a".into()),
            Value::Integer(1),
            Value::Null,
            Value::String("a".into()),
            Value::Bool(false),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(false),
                Value::Integer(1),
                Value::String("a".into()),
                Value::Identifier("a".into()),
            ]
        );
    }

    #[test]
    fn test_string_and_identifier_are_distinct_keys() {
        let mut doc = Document::new();
        doc.insert(Value::String("a".into()), Value::Integer(1));
        doc.insert(Value::Identifier("a".into()), Value::Integer(2));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_float_keys_use_total_order() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Float(1.0), Value::Integer(1));
    }

    #[test]
    fn test_array_keys_hash_structurally() {
        let mut set = HashSet::new();
        set.insert(Value::Array(vec![Value::Integer(1), Value::String("x".into())]));
        assert!(set.contains(&Value::Array(vec![
            Value::Integer(1),
            Value::String("x".into())
        ])));
    }

    #[test]
    fn test_debug_notation() {
        let mut inner = Document::new();
        inner.insert(Value::Integer(2), Value::from("v"));
        let value = Value::Array(vec![
            Value::Null,
            Value::Float(1.5),
            Value::Codepoints(vec!['h', 'i']),
            Value::Identifier("name".into()),
            Value::Document(inner),
        ]);
        assert_eq!(format!("{:?}", value), "[null, 1.5, 'hi', name, {2: \"v\"}]");
    }

    #[test]
    fn test_accessors() {
        assert!(Value::Null.is_null());
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(7i64).as_integer(), Some(7));
        assert_eq!(Value::from(2.5).as_float(), Some(2.5));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::from(vec!['x']).as_codepoints(), Some(&['x'][..]));
        assert_eq!(Value::Identifier("id".into()).as_identifier(), Some("id"));
        assert_eq!(Value::from("s").as_identifier(), None);
        assert_eq!(Value::Document(Document::new()).type_name(), "document");
    }
}

//! The [`Value`] enum and its conversions.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};
use serde_json::Value as Json;

/// A dynamically-typed member value.
///
/// Scalars are stored inline and copied by value. `List` and `Map` hold
/// their storage behind `Rc<RefCell<...>>`, so cloning a container value
/// produces an *alias*: mutations through one clone are visible through
/// every other. The composition engine relies on this to implement
/// shallow-copy field semantics — a type-level container field is one
/// shared storage cell, not a per-instance copy.
///
/// The engine is single-threaded by design, hence `Rc`, not `Arc`.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The absent/none value. Also the return value of an operation
    /// step that returns nothing.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An ordered container. Cloning aliases the storage.
    List(Rc<RefCell<Vec<Value>>>),
    /// A string-keyed container. Cloning aliases the storage.
    Map(Rc<RefCell<BTreeMap<String, Value>>>),
}

impl Value {
    /// Create a list value owning fresh storage.
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Create an empty list value owning fresh storage.
    #[must_use]
    pub fn empty_list() -> Self {
        Self::list(Vec::new())
    }

    /// Create a map value owning fresh storage.
    #[must_use]
    pub fn map(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    /// Create an empty map value owning fresh storage.
    #[must_use]
    pub fn empty_map() -> Self {
        Self::map(BTreeMap::new())
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view: integers widen to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Shared handle to the list storage, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<Rc<RefCell<Vec<Value>>>> {
        match self {
            Value::List(rc) => Some(Rc::clone(rc)),
            _ => None,
        }
    }

    /// Shared handle to the map storage, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<Rc<RefCell<BTreeMap<String, Value>>>> {
        match self {
            Value::Map(rc) => Some(Rc::clone(rc)),
            _ => None,
        }
    }

    /// A short name for the value's type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether two values alias the *same* container storage.
    ///
    /// Scalars never share storage. This is the observable form of the
    /// shallow-copy rule: a class-level default copied onto two entity
    /// types answers `true` here, while two initializer-produced lists
    /// answer `false` even when structurally equal.
    #[must_use]
    pub fn shares_storage(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Convert to a plain JSON value (deep copy — aliasing is lost).
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s.clone()),
            Value::List(items) => {
                Json::Array(items.borrow().iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => Json::Object(
                entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Structural equality: containers compare element-wise, regardless of
/// whether they share storage.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Map(a), Value::Map(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => false,
        }
    }
}

impl From<Json> for Value {
    /// Build a value from JSON. Every container gets fresh storage.
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::list(items.into_iter().map(Value::from).collect()),
            Json::Object(entries) => Value::map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
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

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clone_aliases_list_storage() {
        let a = Value::empty_list();
        let b = a.clone();
        assert!(a.shares_storage(&b));

        a.as_list().unwrap().borrow_mut().push(Value::Int(500));
        assert_eq!(b.as_list().unwrap().borrow().len(), 1);
    }

    #[test]
    fn test_fresh_lists_do_not_share_storage() {
        let a = Value::empty_list();
        let b = Value::empty_list();
        assert!(!a.shares_storage(&b));
        assert_eq!(a, b); // still structurally equal
    }

    #[test]
    fn test_scalars_never_share_storage() {
        let a = Value::Int(7);
        assert!(!a.shares_storage(&a.clone()));
    }

    #[test]
    fn test_from_json_round_trip() {
        let json = json!({"hp": 10, "name": "player", "tags": ["a", "b"], "dead": false});
        let value = Value::from(json.clone());
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_from_json_builds_fresh_containers() {
        let json = json!([1, 2, 3]);
        let a = Value::from(json.clone());
        let b = Value::from(json);
        assert!(!a.shares_storage(&b));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(Value::Int(4).as_f64(), Some(4.0));
        assert_eq!(Value::Float(1.5).as_i64(), None);
        assert_eq!(Value::Str("4".into()).as_f64(), None);
    }

    #[test]
    fn test_structural_equality_across_aliases() {
        let a = Value::list(vec![Value::Int(1)]);
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serialize_matches_json_form() {
        let v = Value::from(json!({"hp": 6, "tags": ["hero"]}));
        let text = serde_json::to_string(&v).unwrap();
        assert_eq!(text, r#"{"hp":6,"tags":["hero"]}"#);
    }

    #[test]
    fn test_display_renders_json() {
        let v = Value::from(json!({"x": 1}));
        assert_eq!(v.to_string(), r#"{"x":1}"#);
    }
}

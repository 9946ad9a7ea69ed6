//! Decoded configuration values
//!
//! Every stored entry decodes into a [`Value`]: a scalar, a sequence, or a
//! mapping. Mapping keys may be integers or strings so that values written by
//! the structure-preserving coding round-trip exactly.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key of a [`Value::Map`] entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapKey {
    Int(i64),
    Str(String),
}

impl MapKey {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            MapKey::Int(i) => Some(*i),
            MapKey::Str(_) => None,
        }
    }

    /// Key read back from text: canonical decimal integers such as `"7"` or
    /// `"-3"` become `Int`, anything else (`"07"`, `"+1"`, `"-0"`) stays `Str`.
    pub fn from_text(text: String) -> Self {
        match text.parse::<i64>() {
            Ok(i) if i.to_string() == text => MapKey::Int(i),
            _ => MapKey::Str(text),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Int(i) => write!(f, "{i}"),
            MapKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::Str(s.to_string())
    }
}

impl From<String> for MapKey {
    fn from(s: String) -> Self {
        MapKey::Str(s)
    }
}

impl From<i64> for MapKey {
    fn from(i: i64) -> Self {
        MapKey::Int(i)
    }
}

/// Structured configuration value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Seq(Vec<Value>),
    Map(BTreeMap<MapKey, Value>),
}

impl Value {
    /// Build a map value from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<MapKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<MapKey, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a string-keyed entry of a map value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()
            .and_then(|map| map.get(&MapKey::Str(key.to_string())))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<BTreeMap<MapKey, Value>> for Value {
    fn from(map: BTreeMap<MapKey, Value>) -> Self {
        Value::Map(map)
    }
}

/// JSON object keys go through [`MapKey::from_text`]; integral numbers that
/// fit `i64` become `Int`, every other number becomes `Float`.
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (MapKey::from_text(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<&Value> for serde_json::Value {
    type Error = String;

    /// Integer map keys are written as strings; non-finite floats and keys
    /// that collide once written as text are rejected.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| format!("{f} cannot be represented in JSON"))?,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Seq(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(serde_json::Value::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Map(map) => {
                let mut object = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    let text = k.to_string();
                    if object.contains_key(&text) {
                        return Err(format!("map key \"{text}\" appears both as integer and string"));
                    }
                    object.insert(text, serde_json::Value::try_from(v)?);
                }
                serde_json::Value::Object(object)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_accessors() {
        let value = Value::map([("host", Value::from("db")), ("port", Value::from(5432))]);

        assert!(value.is_map());
        assert_eq!(value.get("host").and_then(Value::as_str), Some("db"));
        assert_eq!(value.get("port").and_then(Value::as_i64), Some(5432));
        assert_eq!(value.get("port").and_then(Value::as_f64), Some(5432.0));
        assert!(value.get("missing").is_none());
        assert!(Value::from(3).get("host").is_none());
    }

    #[test]
    fn test_value_from_json() {
        let value = Value::from(json!({
            "retries": 3,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "enabled": true,
            "owner": null
        }));

        assert_eq!(value.get("retries"), Some(&Value::Int(3)));
        assert_eq!(value.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(
            value.get("tags"),
            Some(&Value::Seq(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(value.get("enabled"), Some(&Value::Bool(true)));
        assert_eq!(value.get("owner"), Some(&Value::Null));
    }

    #[test]
    fn test_value_to_json_stringifies_int_keys() {
        let value = Value::map([(MapKey::Int(1), "one"), (MapKey::from("two"), "2")]);
        let json = serde_json::Value::try_from(&value).unwrap();
        assert_eq!(json, json!({"1": "one", "two": "2"}));
    }

    #[test]
    fn test_json_numeric_keys_become_int() {
        let value = Value::from(json!({"0": "a", "-3": "b", "07": "c", "name": "d"}));
        let map = value.as_map().unwrap();
        assert_eq!(map.get(&MapKey::Int(0)), Some(&Value::from("a")));
        assert_eq!(map.get(&MapKey::Int(-3)), Some(&Value::from("b")));
        assert_eq!(map.get(&MapKey::from("07")), Some(&Value::from("c")));
        assert_eq!(map.get(&MapKey::from("name")), Some(&Value::from("d")));
    }

    #[test]
    fn test_value_to_json_rejects_colliding_keys() {
        let value = Value::map([(MapKey::Int(0), "a"), (MapKey::from("0"), "b")]);
        assert!(serde_json::Value::try_from(&value).is_err());
    }

    #[test]
    fn test_value_to_json_rejects_nan() {
        assert!(serde_json::Value::try_from(&Value::Float(f64::NAN)).is_err());
        assert!(serde_json::Value::try_from(&Value::Seq(vec![Value::Float(f64::INFINITY)])).is_err());
    }

    #[test]
    fn test_option_and_vec_conversions() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::Seq(vec![Value::Int(1), Value::Int(2)])
        );
    }
}

//! Recursive override merge of map values
//!
//! String keys of the overlay replace the base entry, recursing when both
//! sides hold a map. Integer keys are appended at the next free integer index
//! when already taken, otherwise set in place. Anything that is not a pair of
//! maps is replaced by the overlay.

use std::collections::BTreeMap;

use crate::value::{MapKey, Value};

/// Merge `overlay` into `base`
pub fn merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Map(base), Value::Map(overlay)) => Value::Map(merge_maps(base, overlay)),
        (_, overlay) => overlay,
    }
}

fn merge_maps(
    mut base: BTreeMap<MapKey, Value>,
    overlay: BTreeMap<MapKey, Value>,
) -> BTreeMap<MapKey, Value> {
    for (key, value) in overlay {
        match key {
            MapKey::Int(_) if base.contains_key(&key) => {
                let next = next_index(&base);
                base.insert(MapKey::Int(next), value);
            }
            MapKey::Int(_) => {
                base.insert(key, value);
            }
            MapKey::Str(_) => {
                let merged = match base.remove(&key) {
                    Some(existing @ Value::Map(_)) if value.is_map() => merge(existing, value),
                    _ => value,
                };
                base.insert(key, merged);
            }
        }
    }
    base
}

fn next_index(map: &BTreeMap<MapKey, Value>) -> i64 {
    map.keys()
        .filter_map(MapKey::as_int)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides_and_extends() {
        let base = Value::map([("a", 1), ("b", 2)]);
        let overlay = Value::map([("b", 3), ("c", 4)]);

        assert_eq!(merge(base, overlay), Value::map([("a", 1), ("b", 3), ("c", 4)]));
    }

    #[test]
    fn test_merge_is_recursive() {
        let base = Value::map([
            ("db", Value::map([("host", Value::from("localhost")), ("port", Value::from(5432))])),
            ("debug", Value::from(false)),
        ]);
        let overlay = Value::map([("db", Value::map([("host", "db.internal")]))]);

        let merged = merge(base, overlay);
        let db = merged.get("db").unwrap();
        assert_eq!(db.get("host").and_then(Value::as_str), Some("db.internal"));
        assert_eq!(db.get("port").and_then(Value::as_i64), Some(5432));
        assert_eq!(merged.get("debug"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_merge_replaces_non_maps() {
        assert_eq!(merge(Value::from(1), Value::from("x")), Value::from("x"));
        assert_eq!(
            merge(Value::from(vec![1, 2]), Value::from(vec![3])),
            Value::from(vec![3])
        );
        assert_eq!(
            merge(Value::map([("a", 1)]), Value::from(5)),
            Value::from(5)
        );
        assert_eq!(
            merge(Value::from(5), Value::map([("a", 1)])),
            Value::map([("a", 1)])
        );

        let base = Value::map([("a", Value::map([("x", 1)]))]);
        let overlay = Value::map([("a", 2)]);
        assert_eq!(merge(base, overlay), Value::map([("a", 2)]));
    }

    #[test]
    fn test_merge_appends_taken_int_keys() {
        let base = Value::map([(MapKey::Int(0), "a"), (MapKey::Int(1), "b")]);
        let overlay = Value::map([(MapKey::Int(0), "c"), (MapKey::Int(5), "d")]);

        assert_eq!(
            merge(base, overlay),
            Value::map([
                (MapKey::Int(0), "a"),
                (MapKey::Int(1), "b"),
                (MapKey::Int(2), "c"),
                (MapKey::Int(5), "d"),
            ])
        );
    }
}

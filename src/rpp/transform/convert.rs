//! Conversions between projection values and Rhai values

use crate::rpp::error::ProjectionError;
use crate::rpp::projection::Value;
use rhai::{Array, Dynamic, Map};
use std::collections::BTreeMap;

/// Deep copy a projection into a fresh Rhai value.
pub fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Integer(i) => Dynamic::from_int(*i),
        Value::Float(f) => Dynamic::from_float(*f),
        Value::Sequence(items) => Dynamic::from_array(items.iter().map(to_dynamic).collect()),
        Value::Mapping(map) => {
            let map: Map = map
                .iter()
                .map(|(k, v)| (k.as_str().into(), to_dynamic(v)))
                .collect();
            Dynamic::from_map(map)
        }
    }
}

/// Read a Rhai value back into a projection. Only strings, numbers, arrays and object maps
/// have a projection counterpart.
pub fn from_dynamic(value: Dynamic) -> Result<Value, ProjectionError> {
    if value.is_string() {
        let s = value
            .into_string()
            .map_err(|kind| ProjectionError::new("", format!("unreadable {}", kind)))?;
        return Ok(Value::String(s));
    }
    if value.is_char() {
        let c = value
            .as_char()
            .map_err(|kind| ProjectionError::new("", format!("unreadable {}", kind)))?;
        return Ok(Value::String(c.to_string()));
    }
    if value.is_int() {
        let i = value
            .as_int()
            .map_err(|kind| ProjectionError::new("", format!("unreadable {}", kind)))?;
        return Ok(Value::Integer(i));
    }
    if value.is_float() {
        let f = value
            .as_float()
            .map_err(|kind| ProjectionError::new("", format!("unreadable {}", kind)))?;
        return Ok(Value::Float(f));
    }
    if value.is_array() {
        let items: Array = value
            .into_array()
            .map_err(|kind| ProjectionError::new("", format!("unreadable {}", kind)))?;
        return items
            .into_iter()
            .enumerate()
            .map(|(index, item)| from_dynamic(item).map_err(|e| e.within(&format!("[{}]", index))))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence);
    }
    if value.is_map() {
        let kind = value.type_name();
        let map = value
            .try_cast::<Map>()
            .ok_or_else(|| ProjectionError::new("", format!("unreadable {}", kind)))?;
        let mut out = BTreeMap::new();
        for (key, item) in map {
            let converted = from_dynamic(item).map_err(|e| e.within(key.as_str()))?;
            out.insert(key.to_string(), converted);
        }
        return Ok(Value::Mapping(out));
    }
    Err(ProjectionError::new(
        "",
        format!("{} values cannot be part of a project", value.type_name()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_preserves_values() {
        let mut map = BTreeMap::new();
        map.insert("tag".to_string(), Value::from("A"));
        map.insert(
            "params".to_string(),
            Value::Sequence(vec![Value::Integer(3), Value::Float(1.5), Value::from("x")]),
        );
        let value = Value::Mapping(map);
        assert_eq!(from_dynamic(to_dynamic(&value)).unwrap(), value);
    }

    #[test]
    fn test_unsupported_values_name_their_path() {
        let mut map = Map::new();
        map.insert("ok".into(), Dynamic::from(1_i64));
        map.insert(
            "bad".into(),
            Dynamic::from_array(vec![Dynamic::from("x"), Dynamic::from_bool(true)]),
        );
        let err = from_dynamic(Dynamic::from_map(map)).unwrap_err();
        assert_eq!(err.path, "bad[1]");
        assert!(err.reason.contains("bool"));

        assert!(from_dynamic(Dynamic::UNIT).is_err());
    }

    #[test]
    fn test_char_becomes_string() {
        assert_eq!(
            from_dynamic(Dynamic::from('x')).unwrap(),
            Value::from("x")
        );
    }
}

use rhai::{Array, Dynamic, ImmutableString, Map, FLOAT, INT};
use sr_core::ConvertError;

pub fn new_object() -> Dynamic {
    Dynamic::from_map(Map::new())
}

pub fn new_array() -> Dynamic {
    Dynamic::from_array(Array::new())
}

pub fn is_object(value: &Dynamic) -> bool {
    value.is::<Map>()
}

/// Property read by string key. `None` when the value is not an object or
/// the property is missing; a unit property is returned as-is — absence
/// semantics belong to the cursors.
pub fn get_named(value: &Dynamic, key: &str) -> Option<Dynamic> {
    let map = value.read_lock::<Map>()?;
    map.get(key).cloned()
}

pub fn get_indexed(value: &Dynamic, index: usize) -> Option<Dynamic> {
    let array = value.read_lock::<Array>()?;
    array.get(index).cloned()
}

pub fn set_named(target: &mut Dynamic, key: &str, value: Dynamic) -> Result<(), ConvertError> {
    match target.write_lock::<Map>() {
        Some(mut map) => {
            map.insert(key.into(), value);
            Ok(())
        }
        None => Err(ConvertError::new(
            "CONVERT_NOT_AN_OBJECT",
            format!("Cannot assign property \"{}\" on a non-object value.", key),
        )),
    }
}

/// Slot assignment; the array grows with unit padding when the slot is past
/// the current end.
pub fn set_indexed(target: &mut Dynamic, index: usize, value: Dynamic) -> Result<(), ConvertError> {
    match target.write_lock::<Array>() {
        Some(mut array) => {
            if index >= array.len() {
                array.resize(index + 1, Dynamic::UNIT);
            }
            array[index] = value;
            Ok(())
        }
        None => Err(ConvertError::new(
            "CONVERT_NOT_AN_ARRAY",
            format!("Cannot assign element {} on a non-array value.", index),
        )),
    }
}

pub fn length(value: &Dynamic) -> Option<usize> {
    let array = value.read_lock::<Array>()?;
    Some(array.len())
}

/// Ordered entry enumeration over an object value; empty for anything else.
pub fn entries(value: &Dynamic) -> Vec<(String, Dynamic)> {
    match value.read_lock::<Map>() {
        Some(map) => map
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
        None => Vec::new(),
    }
}

pub fn kind_name(value: &Dynamic) -> &'static str {
    if value.is_unit() {
        "unit"
    } else if value.is::<bool>() {
        "boolean"
    } else if value.is::<INT>() {
        "integer"
    } else if value.is::<FLOAT>() {
        "float"
    } else if value.is::<ImmutableString>() {
        "string"
    } else if value.is::<Array>() {
        "array"
    } else if value.is::<Map>() {
        "object"
    } else {
        "opaque"
    }
}

/// String form of a value, used for map key conversion on encode.
pub fn text(value: &Dynamic) -> String {
    match value.read_lock::<ImmutableString>() {
        Some(string) => string.to_string(),
        None => value.to_string(),
    }
}

/// Diagnostics view of a dynamic value as JSON. Opaque host types map to
/// null; this is a reporting surface, not a conversion path.
pub fn to_json(value: &Dynamic) -> serde_json::Value {
    if value.is_unit() {
        return serde_json::Value::Null;
    }
    if let Some(v) = value.clone().try_cast::<bool>() {
        return serde_json::Value::Bool(v);
    }
    if let Some(v) = value.clone().try_cast::<INT>() {
        return serde_json::json!(v);
    }
    if let Some(v) = value.clone().try_cast::<FLOAT>() {
        return serde_json::json!(v);
    }
    if let Some(v) = value.clone().try_cast::<ImmutableString>() {
        return serde_json::Value::String(v.to_string());
    }
    if let Some(v) = value.clone().try_cast::<Array>() {
        return serde_json::Value::Array(v.iter().map(to_json).collect());
    }
    if let Some(v) = value.clone().try_cast::<Map>() {
        let mut out = serde_json::Map::new();
        for (key, item) in v {
            out.insert(key.to_string(), to_json(&item));
        }
        return serde_json::Value::Object(out);
    }
    serde_json::Value::Null
}

#[cfg(test)]
mod access_tests {
    use super::*;

    #[test]
    fn object_property_read_and_write_round_trip() {
        let mut object = new_object();
        set_named(&mut object, "name", "XXX".into()).expect("set property");
        let read = get_named(&object, "name").expect("property present");
        assert_eq!(read.cast::<ImmutableString>().to_string(), "XXX");
        assert!(get_named(&object, "missing").is_none());
    }

    #[test]
    fn array_assignment_pads_with_unit() {
        let mut array = new_array();
        set_indexed(&mut array, 2, Dynamic::from_int(7)).expect("set element");
        assert_eq!(length(&array), Some(3));
        assert!(get_indexed(&array, 0).expect("padded slot").is_unit());
        assert_eq!(get_indexed(&array, 2).expect("assigned slot").cast::<INT>(), 7);
    }

    #[test]
    fn writes_against_scalars_fail() {
        let mut scalar = Dynamic::from_int(1);
        let error = set_named(&mut scalar, "x", Dynamic::UNIT).expect_err("not an object");
        assert_eq!(error.code, "CONVERT_NOT_AN_OBJECT");
        let error = set_indexed(&mut scalar, 0, Dynamic::UNIT).expect_err("not an array");
        assert_eq!(error.code, "CONVERT_NOT_AN_ARRAY");
    }

    #[test]
    fn entries_enumerate_in_map_order() {
        let mut object = new_object();
        set_named(&mut object, "a", Dynamic::from_int(1)).expect("set a");
        set_named(&mut object, "b", Dynamic::from_int(2)).expect("set b");
        let listed = entries(&object);
        let keys = listed.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(entries(&Dynamic::from_int(1)).is_empty());
    }

    #[test]
    fn length_is_absent_for_non_arrays() {
        assert_eq!(length(&new_object()), None);
        assert_eq!(length(&Dynamic::from_int(1)), None);
    }

    #[test]
    fn json_view_covers_scalars_and_containers() {
        let mut object = new_object();
        set_named(&mut object, "flag", Dynamic::from_bool(true)).expect("set flag");
        set_named(&mut object, "count", Dynamic::from_int(3)).expect("set count");
        let mut array = new_array();
        set_indexed(&mut array, 0, "x".into()).expect("set element");
        set_named(&mut object, "items", array).expect("set items");
        assert_eq!(
            to_json(&object).to_string(),
            r#"{"count":3,"flag":true,"items":["x"]}"#
        );
    }

    #[test]
    fn text_uses_string_content_without_quoting() {
        assert_eq!(text(&Dynamic::from("A".to_string())), "A");
        assert_eq!(text(&Dynamic::from_int(5)), "5");
    }
}

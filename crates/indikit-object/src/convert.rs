//! Conversions between the object model and `serde_json::Value`.
//!
//! `serde_json` is built with `preserve_order`, so maps keep insertion
//! order in both directions and a converted tree serializes with the
//! same member order as the original.

use serde_json::Value as JsonValue;

use crate::dict::Dict;
use crate::list::List;
use crate::object::{Object, Value};

impl From<&JsonValue> for Object {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Object::null(),
            JsonValue::Bool(v) => Object::boolean(*v),
            JsonValue::Number(v) => Object::number(v.as_f64().unwrap_or(0.0)),
            JsonValue::String(v) => Object::string(v.clone()),
            JsonValue::Array(items) => {
                let list = List::new();
                for item in items {
                    list.push_quiet(Object::from(item));
                }
                list.into_object()
            }
            JsonValue::Object(map) => {
                let dict = Dict::new();
                for (key, item) in map {
                    dict.set_quiet(key, Object::from(item));
                }
                dict.into_object()
            }
        }
    }
}

impl From<JsonValue> for Object {
    fn from(value: JsonValue) -> Self {
        Object::from(&value)
    }
}

impl Object {
    /// Converts the subtree into a `serde_json::Value`. Containers are
    /// copied, not shared, so later mutations of either side are
    /// invisible to the other.
    pub fn to_json_value(&self) -> JsonValue {
        let inner = self.inner.borrow();
        match &inner.value {
            Value::Null => JsonValue::Null,
            Value::Boolean(v) => JsonValue::Bool(*v),
            Value::Number(v) => match serde_json::Number::from_f64(*v) {
                Some(n) => JsonValue::Number(n),
                None => JsonValue::Null,
            },
            Value::Str(text) => JsonValue::String(text.value.clone()),
            Value::List(items) => {
                JsonValue::Array(items.iter().map(Object::to_json_value).collect())
            }
            Value::Dict(entries) => {
                let mut map = serde_json::Map::with_capacity(entries.len());
                for entry in entries {
                    map.insert(entry.key.clone(), entry.value.to_json_value());
                }
                JsonValue::Object(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_serde_keeps_member_order() {
        let value = json!({"z": 1, "a": [true, null], "m": "x"});
        let obj = Object::from(&value);
        assert_eq!(obj.to_json_string(), "{\"z\":1,\"a\":[true,null],\"m\":\"x\"}");
    }

    #[test]
    fn to_serde_round_trips_scalars() {
        let dict = Dict::new();
        dict.set("n", 2.5);
        dict.set("b", false);
        dict.set("s", "hi");
        let value = dict.as_object().to_json_value();
        assert_eq!(value, json!({"n": 2.5, "b": false, "s": "hi"}));
    }

    #[test]
    fn non_finite_numbers_become_null() {
        let obj = Object::number(f64::INFINITY);
        assert_eq!(obj.to_json_value(), JsonValue::Null);
    }
}

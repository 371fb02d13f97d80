//! List envelope decoding.
//!
//! # Design
//! Depending on the endpoint the backend answers a list as a bare array, as
//! a resource/paginator envelope `{"data": [...]}` (possibly with `meta` and
//! `links`), or as `{"items": [...]}` / `{"rows": [...]}`. Decoding is a
//! single typed step; what to do with an unknown shape is a `ListPolicy`
//! decision made once per client rather than at every call site.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::prefer_camel_case;

/// The known list shapes, tried in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Items { items: Vec<T> },
    Rows { rows: Vec<T> },
}

impl<T: DeserializeOwned> ListEnvelope<T> {
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Array(_) => Ok(ListEnvelope::Bare(from_value(value)?)),
            Value::Object(mut map) => {
                for key in ["data", "items", "rows"] {
                    if !map.get(key).is_some_and(Value::is_array) {
                        continue;
                    }
                    let list = from_value(map.remove(key).unwrap_or_default())?;
                    return Ok(match key {
                        "data" => ListEnvelope::Data { data: list },
                        "items" => ListEnvelope::Items { items: list },
                        _ => ListEnvelope::Rows { rows: list },
                    });
                }
                Err(unrecognized(&Value::Object(map)))
            }
            other => Err(unrecognized(&other)),
        }
    }

    /// Decode straight to the list, failing on an unknown shape.
    pub fn decode(value: Value) -> Result<Vec<T>, ApiError> {
        Self::from_value(value).map(ListEnvelope::into_vec)
    }
}

impl<T> ListEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(list)
            | ListEnvelope::Data { data: list }
            | ListEnvelope::Items { items: list }
            | ListEnvelope::Rows { rows: list } => list,
        }
    }
}

/// What a list endpoint does with a body that is not a known envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPolicy {
    /// Log a warning and yield an empty list.
    #[default]
    Lenient,
    /// Return `ApiError::UnrecognizedEnvelope`.
    Strict,
}

impl ListPolicy {
    pub fn decode<T: DeserializeOwned>(self, value: Value) -> Result<Vec<T>, ApiError> {
        match ListEnvelope::decode(value) {
            Err(ApiError::UnrecognizedEnvelope { shape }) if self == ListPolicy::Lenient => {
                tracing::warn!(%shape, "expected a list from the API, using an empty one");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

fn from_value<T: DeserializeOwned>(mut value: Value) -> Result<Vec<T>, ApiError> {
    prefer_camel_case(&mut value);
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn unrecognized(value: &Value) -> ApiError {
    let shape = match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
    };
    ApiError::UnrecognizedEnvelope { shape }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn all_known_shapes_normalize_to_the_same_list() {
        let expected = vec![json!({"id": 1}), json!({"id": 2})];
        let inputs = [
            json!([{"id": 1}, {"id": 2}]),
            json!({"data": [{"id": 1}, {"id": 2}], "meta": {"total": 2}, "links": {}}),
            json!({"items": [{"id": 1}, {"id": 2}]}),
            json!({"rows": [{"id": 1}, {"id": 2}]}),
        ];
        for input in inputs {
            let list: Vec<Value> = ListEnvelope::decode(input).unwrap();
            assert_eq!(list, expected);
        }
    }

    #[test]
    fn variants_are_reported() {
        let env: ListEnvelope<u32> = ListEnvelope::from_value(json!({"rows": [3]})).unwrap();
        assert_eq!(env, ListEnvelope::Rows { rows: vec![3] });
        let env: ListEnvelope<u32> = ListEnvelope::from_value(json!([])).unwrap();
        assert_eq!(env, ListEnvelope::Bare(vec![]));
    }

    #[test]
    fn data_must_be_an_array() {
        let env: ListEnvelope<u32> =
            ListEnvelope::from_value(json!({"data": {"nested": true}, "items": [1]})).unwrap();
        assert_eq!(env, ListEnvelope::Items { items: vec![1] });
    }

    #[test]
    fn unknown_shapes_fail_strictly() {
        let err = ListEnvelope::<Value>::decode(json!({"results": []})).unwrap_err();
        match err {
            ApiError::UnrecognizedEnvelope { shape } => {
                assert_eq!(shape, "object with keys [results]");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(ListPolicy::Strict.decode::<Value>(json!("nope")).is_err());
    }

    #[test]
    fn unknown_shapes_are_empty_when_lenient() {
        for input in [json!(null), json!("text"), json!({"total": 0}), json!(5)] {
            let list: Vec<Value> = ListPolicy::Lenient.decode(input).unwrap();
            assert!(list.is_empty());
        }
    }

    #[test]
    fn bad_items_are_not_hidden_by_leniency() {
        let err = ListPolicy::Lenient.decode::<u32>(json!(["x"])).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}

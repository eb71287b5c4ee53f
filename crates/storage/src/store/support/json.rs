#![forbid(unsafe_code)]

use super::super::StoreError;
use fp_core::Turn;
use serde_json::{Map, Value};

pub(in crate::store) fn encode_object(value: &Map<String, Value>) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

/// Every decode allocates fresh values; callers never share structure with stored rows.
pub(in crate::store) fn decode_object(raw: &str) -> Result<Map<String, Value>, StoreError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::InvalidInput("stored json is not an object")),
    }
}

pub(in crate::store) fn encode_turns(turns: &[Turn]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(turns)?)
}

pub(in crate::store) fn decode_turns(raw: &str) -> Result<Vec<Turn>, StoreError> {
    Ok(serde_json::from_str(raw)?)
}

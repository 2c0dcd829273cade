use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::ClassificationFields;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Response is JSON but not an object")]
    NotAnObject,
}

/// Parse a model reply into classification fields.
///
/// The reply must be a single JSON object. Missing keys become empty
/// strings; values are not checked against the vocabularies.
pub fn parse_classification(response: &str) -> Result<ClassificationFields, ParseError> {
    let value: Value = serde_json::from_str(response.trim())?;

    let Value::Object(map) = value else {
        return Err(ParseError::NotAnObject);
    };

    Ok(ClassificationFields {
        sentiment: field(&map, "sentiment"),
        follow_up_needed: field(&map, "follow_up_needed"),
        tag: field(&map, "tag"),
    })
}

fn field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

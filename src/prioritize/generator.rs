//! The text-generation seam.
//!
//! A `Generator` turns a prompt plus an output schema into a JSON value.
//! The prioritizer only talks to this trait, so the production client
//! (`ClaudeHeadless`) and test doubles are interchangeable.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::{Error, Result};

/// Matches a fenced code block, with or without a `json` tag.
static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*\n?(.*?)```").expect("fence regex is valid")
});

#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate structured output for `prompt`, shaped by `schema`.
    ///
    /// Returns `Ok(None)` when the service answered without a payload.
    ///
    /// # Errors
    /// `Error::Generation` when the service is unreachable, times out, or
    /// answers with something that is not JSON.
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<Option<Value>>;
}

/// Pull a JSON payload out of free-form model output.
///
/// Accepts a ```` ```json ```` fence, a bare fence, or the raw text. Blank
/// output and a literal `null` both mean "no payload".
pub fn extract_json(text: &str) -> Result<Option<Value>> {
    let body = FENCED_BLOCK_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim();

    if body.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(Error::Generation(format!(
            "model output is not valid JSON: {}",
            e
        ))),
    }
}

/// Structural check of `value` against the subset of JSON Schema used by
/// the output schemas here: `type`, `required`, `properties` and `items`.
///
/// # Errors
/// `Error::Generation` with the JSON path of the first mismatch.
pub fn check_schema(schema: &Value, value: &Value) -> Result<()> {
    check_at("$", schema, value)
}

fn check_at(path: &str, schema: &Value, value: &Value) -> Result<()> {
    let mismatch = |expected: &str| {
        Error::Generation(format!(
            "model output does not match schema at {}: expected {}",
            path, expected
        ))
    };

    match schema.get("type").and_then(Value::as_str) {
        Some("object") => {
            let object = value.as_object().ok_or_else(|| mismatch("object"))?;
            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for key in required.iter().filter_map(Value::as_str) {
                    if !object.contains_key(key) {
                        return Err(mismatch(&format!("field '{}'", key)));
                    }
                }
            }
            if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
                for (key, sub_schema) in properties {
                    if let Some(field) = object.get(key) {
                        check_at(&format!("{}.{}", path, key), sub_schema, field)?;
                    }
                }
            }
        }
        Some("array") => {
            let items = value.as_array().ok_or_else(|| mismatch("array"))?;
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    check_at(&format!("{}[{}]", path, i), item_schema, item)?;
                }
            }
        }
        Some("string") if !value.is_string() => return Err(mismatch("string")),
        _ => {}
    }
    Ok(())
}

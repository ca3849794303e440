//! Field deserializers that accept the loose shapes a model tends to emit.
//!
//! Scalars may arrive as numbers, lists as a single string, list items as
//! objects carrying a `name`. None of these helpers invent data: anything
//! unreadable becomes the field's empty default or an error for the caller.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Keys consulted, in order, when an object shows up where text was expected.
const TEXT_KEYS: &[&str] = &["name", "skill", "title", "value", "text"];

/// Best-effort plain text for a JSON value.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => TEXT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(value_to_text)),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            Some(parts.join(", "))
        }
    }
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value).unwrap_or_default())
}

/// Like [`string`], but blank text reads as `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value).filter(|s| !s.trim().is_empty()))
}

pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(value_to_text)
            .filter(|s| !s.trim().is_empty())
            .collect()),
        other => Err(D::Error::custom(format!(
            "expected a list of strings, found {}",
            kind(&other)
        ))),
    }
}

/// A list of structured entries. Elements that are not readable as `T`
/// are dropped with a warning rather than failing the whole list.
pub fn entry_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<T>(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Dropping unreadable list entry: {e}");
                    None
                }
            })
            .collect()),
        other => Err(D::Error::custom(format!(
            "expected a list of entries, found {}",
            kind(&other)
        ))),
    }
}

/// A 0–100 score. Floats are rounded, numeric strings parsed, everything clamped.
pub fn score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

//! Forgiving field decoders for persisted records.
//!
//! Blobs written by older builds (or damaged on disk) must still load.
//! Numeric fields that are missing, null, negative or not numbers decode
//! as `0`; fractional values floor. Used through `#[serde(deserialize_with)]`
//! together with `#[serde(default)]`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

pub(crate) fn value_to_seconds(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match number_from(value) {
        Some(f) if f > 0.0 => f.floor() as u64,
        _ => 0,
    }
}

pub(crate) fn value_to_millis(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n.max(0));
    }
    number_from(value).map(|f| if f > 0.0 { f.floor() as i64 } else { 0 })
}

/// Non-negative whole seconds, `0` when unusable.
pub(crate) fn seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_seconds(&value))
}

/// Epoch milliseconds, `0` when unusable.
pub(crate) fn millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_millis(&value).unwrap_or(0))
}

/// Optional epoch milliseconds, `None` when absent or unusable.
pub(crate) fn opt_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_millis(&value))
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Ordered tag list; non-string and blank entries are dropped.
pub(crate) fn tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        })
        .collect())
}

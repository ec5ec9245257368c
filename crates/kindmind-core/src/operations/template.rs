//! Prompt template rendering
//!
//! Supported placeholders:
//! - `{{{path}}}` and `{{path}}`: scalar value at a dotted path in the input
//! - `{{media url=path}}`: data URI at `path`, sent as an inline media part
//!
//! A placeholder naming a missing or null field is a validation error.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::{GatewayError, Result};
use crate::media::DataUri;
use crate::provider::{Blob, Part};

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\{\{\{\s*([A-Za-z_][\w.]*)\s*\}\}\}|\{\{\s*media\s+url=([A-Za-z_][\w.]*)\s*\}\}|\{\{\s*([A-Za-z_][\w.]*)\s*\}\}",
        )
        .expect("static placeholder pattern")
    })
}

/// Resolve a dotted path (`accessibilityNeeds.vision`) inside a JSON value
pub fn get_json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Field paths referenced by a template, in order of appearance
pub fn placeholders(template: &str) -> Vec<String> {
    placeholder_pattern()
        .captures_iter(template)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

/// Render a template against an input value into request parts
pub fn render(template: &str, input: &Value) -> Result<Vec<Part>> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut last = 0;

    for caps in placeholder_pattern().captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        text.push_str(&template[last..whole.start()]);
        last = whole.end();

        if let Some(path) = caps.get(2) {
            let uri = lookup(input, path.as_str())?;
            let uri = uri.as_str().ok_or_else(|| {
                GatewayError::validation(format!("field '{}' must be a data URI string", path.as_str()))
            })?;
            let media = DataUri::parse(uri)?;
            if !text.is_empty() {
                parts.push(Part::Text(std::mem::take(&mut text)));
            }
            parts.push(Part::InlineData(Blob::from(media)));
            continue;
        }

        let path = caps.get(1).or_else(|| caps.get(3));
        if let Some(path) = path {
            let value = lookup(input, path.as_str())?;
            text.push_str(&scalar_to_string(path.as_str(), value)?);
        }
    }

    text.push_str(&template[last..]);
    if !text.is_empty() || parts.is_empty() {
        parts.push(Part::Text(text));
    }
    Ok(parts)
}

fn lookup<'a>(input: &'a Value, path: &str) -> Result<&'a Value> {
    match get_json_path(input, path) {
        Some(Value::Null) | None => Err(GatewayError::validation(format!(
            "template field '{}' is missing from the input",
            path
        ))),
        Some(value) => Ok(value),
    }
}

fn scalar_to_string(path: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(GatewayError::validation(format!(
            "template field '{}' is not a scalar value",
            path
        ))),
    }
}

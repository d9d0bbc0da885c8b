//! Parsing of model output into the enrichment result shapes
//!
//! Models regularly wrap JSON in code fences or surround it with prose, so the
//! JSON values in the text are located and the first one with the expected
//! shape is used. Errors are plain strings; the gateway turns them into
//! failure details.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary: String,
}

/// Every JSON object or array that parses from a `{` or `[` in the response,
/// in order of appearance
pub fn json_candidates(response: &str) -> impl Iterator<Item = Value> + '_ {
    response
        .match_indices(['{', '['])
        .filter_map(move |(start, _)| {
            serde_json::Deserializer::from_str(&response[start..])
                .into_iter::<Value>()
                .next()
                .and_then(Result::ok)
        })
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>, String> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get(key) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(format!("field '{}' is not an array", key)),
            None => return Err(format!("missing field '{}'", key)),
        },
        _ => return Err("model output is neither an object nor an array".to_string()),
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| format!("non-string entry in '{}'", key))
        })
        .filter(|entry| !matches!(entry, Ok(s) if s.is_empty()))
        .collect()
}

/// Parse a list of strings stored under `key`, or given as a bare array.
///
/// The first candidate with the expected shape wins; bracketed prose before
/// the payload is skipped.
pub fn parse_string_list(response: &str, key: &str) -> Result<Vec<String>, String> {
    let mut first_error = None;
    for value in json_candidates(response) {
        match string_list(&value, key) {
            Ok(list) => return Ok(list),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| "no JSON found in model output".to_string()))
}

/// Parse a profile summary
pub fn parse_summary(response: &str) -> Result<String, String> {
    let mut first_error = None;
    for value in json_candidates(response) {
        match serde_json::from_value::<SummaryOutput>(value) {
            Ok(output) => {
                let summary = output.summary.trim();
                if summary.is_empty() {
                    return Err("model returned an empty summary".to_string());
                }
                return Ok(summary.to_string());
            }
            Err(e) => {
                first_error.get_or_insert_with(|| {
                    format!("model output does not match summary schema: {}", e)
                });
            }
        }
    }
    Err(first_error.unwrap_or_else(|| "no JSON found in model output".to_string()))
}

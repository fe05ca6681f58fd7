//! Response extraction — turns raw generator text into trusted shapes.
//!
//! Two entry points:
//! - `extract_question_list`: locates a list-of-strings literal and decodes it
//!   with the strict parser in `literal`. Fails with `FormatError`.
//! - `extract_evaluation`: locates the outermost `{ ... }` span and decodes it
//!   as JSON. Never fails; substitutes a fallback object instead.

pub mod literal;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::extraction::literal::{parse_string_list, LiteralError};
use crate::models::evaluation::EvaluationResult;

static ASSIGNED_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=\s*(\[[\s\S]*?\])").expect("valid regex"));
static ANY_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\[[\s\S]*?\])").expect("valid regex"));
// First `{` to last `}`. Nested or multiple objects can be mis-captured.
static OBJECT_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("no list located in generator output")]
    NoListLocated,

    #[error("parsed output is not a list of strings")]
    NotStringList,

    #[error("invalid list literal: {0}")]
    InvalidLiteral(String),

    #[error("generator returned an empty question list")]
    EmptyList,
}

/// Extracts an ordered list of questions from generator output.
pub fn extract_question_list(raw_text: &str) -> Result<Vec<String>, FormatError> {
    let text = strip_code_fences(raw_text);

    let list_str = ASSIGNED_LIST
        .captures(text)
        .or_else(|| ANY_LIST.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(FormatError::NoListLocated)?;

    let questions = parse_string_list(list_str).map_err(|e| match e {
        LiteralError::NotAString(_) => FormatError::NotStringList,
        other => FormatError::InvalidLiteral(other.to_string()),
    })?;

    if questions.is_empty() {
        return Err(FormatError::EmptyList);
    }
    Ok(questions)
}

/// Extracts the evaluation object from generator output.
///
/// The returned value is always a JSON object: either the decoded object,
/// untouched, or one of the fallbacks. Key validation is left to the caller.
pub fn extract_evaluation(raw_text: &str) -> Value {
    let Some(span) = OBJECT_SPAN.find(raw_text) else {
        warn!("No JSON object found in generator evaluation output");
        return EvaluationResult::invalid_output().to_value();
    };

    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(value) => value,
        Err(e) => {
            warn!("Could not parse generator evaluation output: {e}");
            EvaluationResult::unparseable().to_value()
        }
    }
}

/// Strips ```python / ```json / ``` fences wrapping generator output.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = ["```python", "```json", "```"]
        .iter()
        .find_map(|fence| text.strip_prefix(fence))
        .map(str::trim_start)
        .unwrap_or(text);
    text.strip_suffix("```").map(str::trim_end).unwrap_or(text)
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 10;

/// Structured feedback for one answer. All three fields are always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: i64,
    pub feedback: String,
    pub improvement: String,
}

impl EvaluationResult {
    fn fallback(feedback: &str, improvement: &str) -> Self {
        Self {
            score: 0,
            feedback: feedback.to_string(),
            improvement: improvement.to_string(),
        }
    }

    /// No object-shaped span in the generator output.
    pub fn invalid_output() -> Self {
        Self::fallback(
            "generator returned invalid output",
            "ensure strict structured format in the prompt",
        )
    }

    /// An object-shaped span was found but is not valid JSON.
    pub fn unparseable() -> Self {
        Self::fallback(
            "could not parse generator response",
            "retry with rephrased answer",
        )
    }

    /// Decoded JSON lacks one of the required keys.
    pub fn missing_fields() -> Self {
        Self::fallback(
            "evaluation missing expected fields",
            "retry with a more complete answer",
        )
    }

    /// The generator call itself failed.
    pub fn request_failed() -> Self {
        Self::fallback(
            "generator request failed",
            "try again later; possible quota exhaustion",
        )
    }

    /// Validates a decoded evaluation object.
    ///
    /// Requires a `score` that is a number or a numeric string, and string
    /// `feedback` / `improvement`.
    /// Scores are rounded and clamped into `MIN_SCORE..=MAX_SCORE`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let raw_score = parse_score(value.get("score")?)?;
        let feedback = value.get("feedback")?.as_str()?;
        let improvement = value.get("improvement")?.as_str()?;

        let rounded = raw_score.round() as i64;
        let score = rounded.clamp(MIN_SCORE, MAX_SCORE);
        if score != rounded || raw_score.fract() != 0.0 {
            warn!("Generator score {raw_score} normalized to {score}");
        }

        Some(Self {
            score,
            feedback: feedback.to_string(),
            improvement: improvement.to_string(),
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "score": self.score,
            "feedback": self.feedback,
            "improvement": self.improvement,
        })
    }

    /// JSON text form, as returned to clients.
    pub fn to_json_text(&self) -> String {
        self.to_value().to_string()
    }
}

fn parse_score(score: &Value) -> Option<f64> {
    match score {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

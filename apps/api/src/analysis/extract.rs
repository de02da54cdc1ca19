//! Result extraction: the model's free-form text in, a structured
//! `AnalysisResult` out.
//!
//! The model is asked for a single JSON object but the text is not
//! guaranteed well-formed, so parsing runs through an ordered chain of
//! pure fallback strategies, accepting the first that yields an object.

use serde_json::{Map, Number, Value};

use crate::analysis::models::AnalysisResult;
use crate::errors::AppError;
use crate::model_client::ModelEnvelope;

/// Ordered fallback chain. Each strategy is pure; the first success wins.
const STRATEGIES: [fn(&str) -> Option<Value>; 3] = [parse_direct, parse_fenced, parse_brace_span];

/// Extracts the structured result from a model envelope.
pub fn extract_result(envelope: &ModelEnvelope) -> Result<AnalysisResult, AppError> {
    let text = match envelope.candidate_text() {
        Some(text) => text,
        None => {
            return Err(if envelope.block_reason().is_some() {
                AppError::BlockedByPolicy
            } else {
                AppError::MalformedEnvelope
            });
        }
    };

    let value = STRATEGIES
        .iter()
        .find_map(|strategy| strategy(text))
        .ok_or(AppError::UnparseableResult)?;

    Ok(normalize_result(value))
}

/// Parses the whole text as one JSON object.
fn parse_direct(text: &str) -> Option<Value> {
    parse_object(text)
}

/// Parses the interior of the first code fence, optionally tagged `json`.
fn parse_fenced(text: &str) -> Option<Value> {
    let start = text.find("```")?;
    let interior = &text[start + 3..];
    let interior = interior.strip_prefix("json").unwrap_or(interior);
    let end = interior.find("```")?;
    parse_object(interior[..end].trim())
}

/// Parses the span from the first `{` to the last `}` inclusive.
fn parse_brace_span(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    parse_object(&text[start..=end])
}

// The result contract requires an object to hang `score` on, so a strategy
// that parses to a bare array/number/string has not succeeded.
fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Guarantees a numeric `score` to downstream consumers; everything else
/// passes through with whatever shape it arrived in.
fn normalize_result(value: Value) -> AnalysisResult {
    let mut details = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let score = match details.remove("score") {
        Some(Value::Number(n)) => n,
        _ => Number::from(0),
    };

    AnalysisResult { score, details }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope_with_text(text: &str) -> ModelEnvelope {
        serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        }))
        .unwrap()
    }

    #[test]
    fn test_direct_parse_round_trips_all_attributes() {
        let text = r#"{"score": 73, "verdict": "GOOD_MATCH", "gaps": [{"severity": "MINOR"}]}"#;
        let result = extract_result(&envelope_with_text(text)).unwrap();
        assert_eq!(result.score, Number::from(73));
        assert_eq!(result.details["verdict"], json!("GOOD_MATCH"));
        assert_eq!(result.details["gaps"], json!([{"severity": "MINOR"}]));
    }

    #[test]
    fn test_fenced_block_with_json_tag() {
        let text = "```json\n{\"score\": 55}\n```";
        let result = extract_result(&envelope_with_text(text)).unwrap();
        assert_eq!(result.score, Number::from(55));
    }

    #[test]
    fn test_fenced_block_without_tag() {
        let text = "```\n{\"score\": 55}\n```";
        let result = extract_result(&envelope_with_text(text)).unwrap();
        assert_eq!(result.score, Number::from(55));
    }

    #[test]
    fn test_fenced_block_inside_prose() {
        let text = "Here is the analysis:\n```json\n{\"score\": 41}\n```\nHope it helps!";
        let result = extract_result(&envelope_with_text(text)).unwrap();
        assert_eq!(result.score, Number::from(41));
    }

    #[test]
    fn test_fenced_extraction_matches_unwrapped_interior() {
        let interior = r#"{"score": 88, "verdict": "GOOD_MATCH"}"#;
        let wrapped = format!("```json\n{interior}\n```");
        let direct = extract_result(&envelope_with_text(interior)).unwrap();
        let fenced = extract_result(&envelope_with_text(&wrapped)).unwrap();
        assert_eq!(direct.score, fenced.score);
        assert_eq!(direct.details, fenced.details);
    }

    #[test]
    fn test_brace_span_with_surrounding_prose() {
        let text = "The result is {\"score\": 12, \"verdict\": \"POOR_MATCH\"} as requested.";
        let result = extract_result(&envelope_with_text(text)).unwrap();
        assert_eq!(result.score, Number::from(12));
        assert_eq!(result.details["verdict"], json!("POOR_MATCH"));
    }

    #[test]
    fn test_missing_score_coerced_to_zero() {
        let result = extract_result(&envelope_with_text(r#"{"verdict": "WEAK_MATCH"}"#)).unwrap();
        assert_eq!(result.score, Number::from(0));
        assert_eq!(result.details["verdict"], json!("WEAK_MATCH"));
    }

    #[test]
    fn test_non_numeric_score_coerced_to_zero() {
        let result = extract_result(&envelope_with_text(r#"{"score": "high"}"#)).unwrap();
        assert_eq!(result.score, Number::from(0));
    }

    #[test]
    fn test_unparseable_text_is_terminal() {
        let err = extract_result(&envelope_with_text("I could not produce JSON, sorry."));
        assert!(matches!(err.unwrap_err(), AppError::UnparseableResult));
    }

    #[test]
    fn test_empty_text_is_unparseable() {
        let err = extract_result(&envelope_with_text(""));
        assert!(matches!(err.unwrap_err(), AppError::UnparseableResult));
    }

    #[test]
    fn test_bare_array_is_not_accepted() {
        let err = extract_result(&envelope_with_text("[1, 2, 3]"));
        assert!(matches!(err.unwrap_err(), AppError::UnparseableResult));
    }

    #[test]
    fn test_blocked_envelope_beats_malformed() {
        let envelope: ModelEnvelope = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(
            extract_result(&envelope).unwrap_err(),
            AppError::BlockedByPolicy
        ));
    }

    #[test]
    fn test_empty_envelope_is_malformed() {
        let envelope: ModelEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            extract_result(&envelope).unwrap_err(),
            AppError::MalformedEnvelope
        ));
    }

    #[test]
    fn test_candidate_without_parts_is_malformed() {
        let envelope: ModelEnvelope =
            serde_json::from_value(json!({"candidates": [{"content": {}}]})).unwrap();
        assert!(matches!(
            extract_result(&envelope).unwrap_err(),
            AppError::MalformedEnvelope
        ));
    }
}

//! Input sanitization for the two free-text fields.
//!
//! Runs after length validation (bounds are checked against raw input) and
//! before the prompt is assembled, so nothing markup-shaped ever reaches the
//! model payload.

use std::sync::LazyLock;

use regex::Regex;

static MARKUP_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static SCRIPT_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("valid regex"));
static EVENT_HANDLERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on\w+=").expect("valid regex"));
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Strips markup tags, neutralizes script-triggering URL schemes and inline
/// event-handler attributes, collapses runs of blank lines, and trims.
pub fn sanitize_input(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let sanitized = MARKUP_TAGS.replace_all(input, "");
    let sanitized = SCRIPT_SCHEME.replace_all(&sanitized, "");
    let sanitized = EVENT_HANDLERS.replace_all(&sanitized, "");
    let sanitized = BLANK_RUNS.replace_all(&sanitized, "\n\n");

    sanitized.trim().to_string()
}

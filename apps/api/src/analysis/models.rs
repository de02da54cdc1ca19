use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Response language selector. A closed two-value contract: unknown wire
/// values are rejected by `parse` so callers keep the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Pt,
    En,
}

impl Language {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pt" => Some(Language::Pt),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

/// A fully normalized submission, ready for prompt assembly.
/// Exists only for the duration of one pipeline invocation; never persisted.
#[derive(Clone)]
pub struct AnalysisRequest {
    pub job_description: String,
    pub resume: String,
    pub credential: String,
    pub language: Language,
}

impl fmt::Debug for AnalysisRequest {
    // The credential must never reach logs, so Debug is written by hand.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisRequest")
            .field("job_description", &self.job_description)
            .field("resume", &self.resume)
            .field("credential", &"<redacted>")
            .field("language", &self.language)
            .finish()
    }
}

/// The structured evaluation returned to the caller.
///
/// Only `score` is guaranteed; everything else the model produced
/// (breakdown, verdict, gaps, recommendations, ...) passes through in
/// `details` with whatever shape it arrived in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: Number,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

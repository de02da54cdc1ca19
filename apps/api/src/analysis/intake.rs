//! Input normalization: heterogeneous submissions in, a validated
//! `AnalysisRequest` out. Every step short-circuits with a distinct
//! `AppError` so the boundary can map each failure to its own status.

use anyhow::anyhow;
use axum::extract::multipart::Multipart;
use bytes::Bytes;
use serde::Deserialize;

use crate::analysis::document;
use crate::analysis::models::{AnalysisRequest, Language};
use crate::analysis::sanitize::sanitize_input;
use crate::errors::AppError;

pub const JOB_DESCRIPTION_MIN_CHARS: usize = 100;
pub const JOB_DESCRIPTION_MAX_CHARS: usize = 25_000;
pub const RESUME_MIN_CHARS: usize = 50;
pub const RESUME_MAX_CHARS: usize = 25_000;

const CREDENTIAL_PREFIX: &str = "AIza";
const CREDENTIAL_MIN_CHARS: usize = 30;

/// A resume uploaded as a document rather than inline text.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Content type the part declared for itself. Checked, never trusted
    /// beyond gating which converter runs.
    pub content_type: String,
    pub bytes: Bytes,
}

/// Raw fields pulled out of either submission encoding, before validation.
#[derive(Debug, Default)]
pub struct RawSubmission {
    pub job_description: String,
    pub resume_text: String,
    pub resume_document: Option<DocumentUpload>,
    pub credential: String,
    pub language: Language,
}

/// Collects fields from a multipart submission. Unknown parts are ignored.
pub async fn collect_multipart(mut multipart: Multipart) -> Result<RawSubmission, AppError> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Internal(anyhow!("multipart read failed: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jobDescription" => raw.job_description = read_text_field(field).await?,
            "apiKey" => raw.credential = read_text_field(field).await?,
            "resumeText" => raw.resume_text = read_text_field(field).await?,
            "language" => {
                if let Some(language) = Language::parse(&read_text_field(field).await?) {
                    raw.language = language;
                }
            }
            "resumeFile" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Internal(anyhow!("multipart read failed: {e}")))?;
                if !bytes.is_empty() {
                    raw.resume_document = Some(DocumentUpload {
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(raw)
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Internal(anyhow!("multipart read failed: {e}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonSubmission {
    #[serde(default)]
    job_description: Option<String>,
    #[serde(default)]
    resume: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

/// Collects fields from a JSON submission. Document upload is not supported
/// in this mode.
pub fn collect_json(body: &[u8]) -> Result<RawSubmission, AppError> {
    let parsed: JsonSubmission = serde_json::from_slice(body)
        .map_err(|e| AppError::Internal(anyhow!("json body parse failed: {e}")))?;

    let mut raw = RawSubmission {
        job_description: parsed.job_description.unwrap_or_default(),
        resume_text: parsed.resume.unwrap_or_default(),
        credential: parsed.api_key.unwrap_or_default(),
        ..RawSubmission::default()
    };
    if let Some(language) = parsed.language.as_deref().and_then(Language::parse) {
        raw.language = language;
    }

    Ok(raw)
}

/// Runs the ordered validation steps over a raw submission:
/// document ingestion, presence, length bounds, sanitization, credential
/// shape. Bounds are checked against raw lengths; sanitization runs after.
pub fn normalize(raw: RawSubmission) -> Result<AnalysisRequest, AppError> {
    let RawSubmission {
        job_description,
        resume_text,
        resume_document,
        credential,
        language,
    } = raw;

    let resume = match resume_document {
        Some(upload) => {
            if upload.content_type != document::PDF_CONTENT_TYPE {
                return Err(AppError::UnsupportedDocumentType);
            }
            document::extract_document_text(&upload.bytes)?
        }
        None => resume_text,
    };

    if job_description.is_empty() || resume.is_empty() {
        return Err(AppError::MissingFields);
    }

    check_length(
        "Job description",
        &job_description,
        JOB_DESCRIPTION_MIN_CHARS,
        JOB_DESCRIPTION_MAX_CHARS,
    )?;
    check_length("Resume content", &resume, RESUME_MIN_CHARS, RESUME_MAX_CHARS)?;

    let job_description = sanitize_input(&job_description);
    let resume = sanitize_input(&resume);

    if credential.is_empty() {
        return Err(AppError::InvalidCredential("API key is required"));
    }
    if !credential.starts_with(CREDENTIAL_PREFIX) || credential.len() < CREDENTIAL_MIN_CHARS {
        return Err(AppError::InvalidCredential("Invalid API key format"));
    }

    Ok(AnalysisRequest {
        job_description,
        resume,
        credential,
        language,
    })
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let chars = value.chars().count();
    if chars < min {
        return Err(AppError::LengthOutOfBounds(format!(
            "{field} must be at least {min} characters"
        )));
    }
    if chars > max {
        return Err(AppError::LengthOutOfBounds(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

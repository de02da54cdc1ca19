use anyhow::anyhow;
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{
        header::{HeaderName, HeaderValue, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::analysis::models::AnalysisResult;
use crate::analysis::{assemble, extract, intake};
use crate::errors::AppError;
use crate::quota::{self, QuotaDecision};
use crate::state::AppState;

/// Ceiling for JSON bodies; text fields are bounded far below this anyway.
const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

/// POST /api/v1/analyze
///
/// Admission check first, then the intake/assembly/call/extraction pipeline.
/// The quota headers are attached to every response, success or failure, so
/// callers can self-throttle.
pub async fn handle_analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Response {
    let key = quota::client_key(&headers);
    let decision = state.quota.check(&key).await;

    let mut response = match run_pipeline(&state, &headers, request, &decision, &key).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    };

    apply_quota_headers(
        response.headers_mut(),
        state.config.rate_limit_ceiling,
        &decision,
    );
    response
}

async fn run_pipeline(
    state: &AppState,
    headers: &HeaderMap,
    request: Request,
    decision: &QuotaDecision,
    key: &str,
) -> Result<AnalysisResult, AppError> {
    if !decision.allowed {
        debug!("admission denied for client {key}");
        return Err(AppError::Throttled);
    }

    let raw = collect_submission(headers, request).await?;
    let normalized = intake::normalize(raw)?;

    let payload = assemble::assemble(&normalized);
    let envelope = state.model.invoke(&payload, &normalized.credential).await?;

    extract::extract_result(&envelope)
}

/// Content-shape dispatch: multipart or JSON, anything else is rejected
/// before any body is read.
async fn collect_submission(
    headers: &HeaderMap,
    request: Request,
) -> Result<intake::RawSubmission, AppError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::Internal(anyhow!("multipart extraction failed: {e}")))?;
        intake::collect_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let body = axum::body::to_bytes(request.into_body(), MAX_JSON_BODY_BYTES)
            .await
            .map_err(|e| AppError::Internal(anyhow!("body read failed: {e}")))?;
        intake::collect_json(&body)
    } else {
        Err(AppError::UnsupportedFormat)
    }
}

fn apply_quota_headers(headers: &mut HeaderMap, ceiling: u32, decision: &QuotaDecision) {
    let entries = [
        ("x-ratelimit-limit", ceiling.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.reset_at.to_string()),
    ];
    for (name, value) in entries {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_headers_are_attached() {
        let mut headers = HeaderMap::new();
        let decision = QuotaDecision {
            allowed: true,
            remaining: 3,
            reset_at: 1_700_000_060_000,
        };
        apply_quota_headers(&mut headers, 5, &decision);
        assert_eq!(headers["x-ratelimit-limit"], "5");
        assert_eq!(headers["x-ratelimit-remaining"], "3");
        assert_eq!(headers["x-ratelimit-reset"], "1700000060000");
    }
}

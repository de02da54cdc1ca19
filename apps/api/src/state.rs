use std::sync::Arc;

use crate::config::Config;
use crate::model_client::GeminiClient;
use crate::quota::QuotaStore;

/// Shared application state injected into all route handlers via Axum
/// extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable admission store. Default: `MemoryQuotaStore`; the trait
    /// seam allows a distributed store without touching the pipeline.
    pub quota: Arc<dyn QuotaStore>,
    pub model: GeminiClient,
    pub config: Config,
}

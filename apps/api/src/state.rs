use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::store::AnalysisStore;
use crate::config::Config;
use crate::llm_client::GenerationBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Generation backend. Default: `LlmClient` against `GENERATION_API_URL`.
    pub llm: Arc<dyn GenerationBackend>,
    /// Analysis history store. Default: `PgAnalysisStore` on the same pool.
    pub analyses: Arc<dyn AnalysisStore>,
    pub config: Config,
}

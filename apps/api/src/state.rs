use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::TextGenerator;
use crate::sessions::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// The LLM oracle behind its trait seam. Production wires `LlmClient`;
    /// tests substitute a scripted stub.
    pub llm: Arc<dyn TextGenerator>,
    /// Live interview sessions, one per candidate.
    pub sessions: SessionRegistry,
}

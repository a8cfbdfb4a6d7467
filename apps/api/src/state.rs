use std::sync::Arc;

use sqlx::PgPool;

use crate::pipeline::runner::StageRunner;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Pluggable stage backend. Default: the LLM-backed runner; tests inject
    /// scripted runners.
    pub stage_runner: Arc<dyn StageRunner>,
}

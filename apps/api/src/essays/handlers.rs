//! HTTP handlers for essay brainstorming, feedback, and thread management.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::essays::threads;
use crate::models::envelope::ApiEnvelope;
use crate::models::thread::ThreadKind;
use crate::recommend::handlers::outcome_envelope;
use crate::recommend::orchestrator::{self, EssayFeedbackRequest, EssayIdeasRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ThreadKindQuery {
    pub kind: ThreadKind,
}

/// POST /api/v1/essays/brainstorm
pub async fn generate_essay_ideas(
    State(state): State<AppState>,
    Json(request): Json<EssayIdeasRequest>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let outcome =
        orchestrator::generate_essay_ideas(&state.db, state.stage_runner.as_ref(), request).await?;
    Ok(Json(outcome_envelope(outcome, "essay_ideas")))
}

/// POST /api/v1/essays/feedback
pub async fn generate_essay_feedback(
    State(state): State<AppState>,
    Json(request): Json<EssayFeedbackRequest>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let outcome =
        orchestrator::generate_essay_feedback(&state.db, state.stage_runner.as_ref(), request)
            .await?;
    Ok(Json(outcome_envelope(outcome, "feedback")))
}

/// GET /api/v1/essays/threads/:student_id?kind=brainstorm
pub async fn list_threads(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<ThreadKindQuery>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let threads = threads::list_threads(&state.db, student_id, query.kind).await?;
    let total = threads.len();
    Ok(Json(ApiEnvelope::success(serde_json::json!({
        "threads": threads,
        "total": total,
    }))))
}

/// GET /api/v1/essays/threads/:student_id/:thread_id
pub async fn get_thread(
    State(state): State<AppState>,
    Path((student_id, thread_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let thread = threads::find_thread(&state.db, student_id, thread_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Thread {thread_id} not found")))?;
    Ok(Json(ApiEnvelope::success(serde_json::json!({
        "thread": thread,
    }))))
}

/// DELETE /api/v1/essays/threads/:student_id/:thread_id
pub async fn delete_thread(
    State(state): State<AppState>,
    Path((student_id, thread_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let deleted = threads::delete_thread(&state.db, student_id, thread_id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Thread {thread_id} not found")));
    }
    Ok(Json(ApiEnvelope::ok()))
}

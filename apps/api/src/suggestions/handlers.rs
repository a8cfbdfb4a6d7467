//! HTTP handlers for the suggestion lifecycle: current and past pools,
//! target list promotion, and removal from any pool.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::envelope::ApiEnvelope;
use crate::models::suggestion::{SuggestionKind, SuggestionPage};
use crate::profile::store as profile_store;
use crate::state::AppState;
use crate::suggestions::store::{self, StorePhase};

const NO_CURRENT_SUGGESTIONS: &str =
    "No current suggestions. Generate new suggestions to see matches.";

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
pub struct KindQuery {
    pub kind: SuggestionKind,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub kind: SuggestionKind,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct TargetPageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pool a lifecycle operation draws from or deletes out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Current,
    Past,
    Target,
}

impl SuggestionSource {
    fn as_str(self) -> &'static str {
        match self {
            SuggestionSource::Current => "current",
            SuggestionSource::Past => "past",
            SuggestionSource::Target => "target",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTargetRequest {
    pub kind: SuggestionKind,
    pub name: String,
    #[serde(default = "default_add_source")]
    pub source: SuggestionSource,
}

fn default_add_source() -> SuggestionSource {
    SuggestionSource::Current
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub kind: SuggestionKind,
    pub name: String,
    pub source: SuggestionSource,
}

/// GET /api/v1/suggestions/:student_id/current?kind=college
pub async fn current_suggestions(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<KindQuery>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let suggestions = store::current_suggestions(&state.db, student_id, query.kind).await?;
    let total = suggestions.len();
    let mut data = serde_json::json!({
        "suggestions": suggestions,
        "total": total,
    });
    if total == 0 {
        data["message"] = serde_json::json!(NO_CURRENT_SUGGESTIONS);
    }
    Ok(Json(ApiEnvelope::success(data)))
}

/// GET /api/v1/suggestions/:student_id/past?kind=college&page=1&per_page=10
pub async fn past_suggestions(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let page = store::past_suggestions_page(
        &state.db,
        student_id,
        query.kind,
        query.page,
        query.per_page,
    )
    .await?;
    Ok(Json(page_envelope(page)?))
}

/// POST /api/v1/suggestions/:student_id/target
///
/// Promote a record from the current or past pool onto the student's target
/// list, then remove it from the pool it came from.
pub async fn add_target(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(request): Json<AddTargetRequest>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let phase = match request.source {
        SuggestionSource::Current => StorePhase::Staging,
        SuggestionSource::Past => StorePhase::History,
        SuggestionSource::Target => {
            return Err(AppError::Validation(
                "source must be current or past".to_string(),
            ))
        }
    };

    let record = store::find_suggestion(&state.db, student_id, phase, request.kind, &request.name)
        .await?
        .ok_or_else(|| AppError::NotFound(not_found_message(request.kind)))?;

    let added = profile_store::add_target(&state.db, student_id, &record).await?;
    if !added {
        return Err(AppError::Internal(anyhow::anyhow!(
            "failed to add '{}' to the target list",
            request.name
        )));
    }

    let removed =
        store::remove_suggestion(&state.db, student_id, phase, request.kind, &request.name).await?;
    if !removed {
        warn!(
            %student_id,
            name = %request.name,
            source = request.source.as_str(),
            "record promoted to target but still present in its source pool"
        );
    }

    Ok(Json(ApiEnvelope::ok()))
}

/// DELETE /api/v1/suggestions/:student_id?kind=college&name=...&source=target
pub async fn delete_suggestion(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let removed = match query.source {
        SuggestionSource::Target => {
            profile_store::remove_target(&state.db, student_id, query.kind, &query.name).await?
        }
        SuggestionSource::Current => {
            store::remove_suggestion(
                &state.db,
                student_id,
                StorePhase::Staging,
                query.kind,
                &query.name,
            )
            .await?
        }
        SuggestionSource::Past => {
            store::remove_suggestion(
                &state.db,
                student_id,
                StorePhase::History,
                query.kind,
                &query.name,
            )
            .await?
        }
    };

    if !removed {
        return Err(AppError::NotFound(format!(
            "'{}' not found in {} suggestions",
            query.name,
            query.source.as_str()
        )));
    }
    Ok(Json(ApiEnvelope::ok()))
}

/// GET /api/v1/students/:student_id/target-colleges?page=1&per_page=10
pub async fn target_colleges(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<TargetPageQuery>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let page = profile_store::target_page(
        &state.db,
        student_id,
        SuggestionKind::College,
        query.page,
        query.per_page,
    )
    .await?;
    Ok(Json(page_envelope(page)?))
}

/// GET /api/v1/students/:student_id/target-activities?page=1&per_page=10
pub async fn target_activities(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Query(query): Query<TargetPageQuery>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let page = profile_store::target_page(
        &state.db,
        student_id,
        SuggestionKind::Activity,
        query.page,
        query.per_page,
    )
    .await?;
    Ok(Json(page_envelope(page)?))
}

fn page_envelope(page: SuggestionPage) -> Result<ApiEnvelope, AppError> {
    let data = serde_json::to_value(page).map_err(|e| AppError::Internal(e.into()))?;
    Ok(ApiEnvelope::success(data))
}

fn not_found_message(kind: SuggestionKind) -> String {
    match kind {
        SuggestionKind::College => "College not found in suggestions".to_string(),
        SuggestionKind::Activity => "Activity not found in suggestions".to_string(),
        SuggestionKind::Idea | SuggestionKind::Feedback => {
            "Suggestion not found".to_string()
        }
    }
}

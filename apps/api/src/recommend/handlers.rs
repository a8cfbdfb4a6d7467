//! HTTP handlers for the two recommendation endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::envelope::ApiEnvelope;
use crate::recommend::orchestrator::{self, RunOutcome};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CollegeListRequest {
    #[serde(default)]
    pub college_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRecommendationsRequest {
    pub activity_type: String,
    pub hrs_per_wk: u32,
}

/// POST /api/v1/recommendations/college-list/:student_id
///
/// Body is optional; `college_type` narrows the run to one classification.
pub async fn generate_college_list(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    body: Option<Json<CollegeListRequest>>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let college_type = body.and_then(|Json(request)| request.college_type);
    let outcome = orchestrator::generate_college_list(
        &state.db,
        state.stage_runner.as_ref(),
        student_id,
        college_type.as_deref(),
    )
    .await?;
    Ok(Json(outcome_envelope(outcome, "college_list")))
}

/// POST /api/v1/recommendations/activities/:student_id
pub async fn generate_activity_recommendations(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    Json(request): Json<ActivityRecommendationsRequest>,
) -> Result<Json<ApiEnvelope>, AppError> {
    let outcome = orchestrator::generate_activity_recommendations(
        &state.db,
        state.stage_runner.as_ref(),
        student_id,
        &request.activity_type,
        request.hrs_per_wk,
    )
    .await?;
    Ok(Json(outcome_envelope(outcome, "recommendations")))
}

/// Map a run outcome onto the response envelope, keying the raw output
/// under `data_key` and attaching the thread id when the flow has one.
pub(crate) fn outcome_envelope(outcome: RunOutcome, data_key: &str) -> ApiEnvelope {
    match outcome {
        RunOutcome::Success {
            raw_output,
            warning,
            resumed_from,
            thread_id,
        } => {
            if let Some(stage_index) = resumed_from {
                debug!("run succeeded after resuming from stage {stage_index}");
            }
            let mut data = serde_json::Map::new();
            data.insert(
                data_key.to_string(),
                serde_json::Value::String(raw_output),
            );
            if let Some(thread_id) = thread_id {
                data.insert("thread_id".to_string(), serde_json::json!(thread_id));
            }
            ApiEnvelope::success(serde_json::Value::Object(data)).with_warning(warning)
        }
        RunOutcome::Blocked(message) | RunOutcome::Failed(message) => {
            ApiEnvelope::failure(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_outcome_keys_raw_output() {
        let outcome = RunOutcome::Success {
            raw_output: "1. Rice University | Private (target)".to_string(),
            warning: None,
            resumed_from: None,
            thread_id: None,
        };
        let value = serde_json::to_value(outcome_envelope(outcome, "college_list")).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(
            value["data"]["college_list"],
            "1. Rice University | Private (target)"
        );
        assert!(value["data"].get("thread_id").is_none());
    }

    #[test]
    fn test_thread_id_and_warning_surface_in_envelope() {
        let thread_id = Uuid::new_v4();
        let outcome = RunOutcome::Success {
            raw_output: "1. An idea".to_string(),
            warning: Some("save failed".to_string()),
            resumed_from: Some(2),
            thread_id: Some(thread_id),
        };
        let value = serde_json::to_value(outcome_envelope(outcome, "essay_ideas")).unwrap();
        assert_eq!(value["data"]["thread_id"], thread_id.to_string());
        assert_eq!(value["warning"], "save failed");
    }

    #[test]
    fn test_blocked_and_failed_become_envelope_failures() {
        let value =
            serde_json::to_value(outcome_envelope(RunOutcome::Blocked("incomplete".into()), "x"))
                .unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "incomplete");

        let value =
            serde_json::to_value(outcome_envelope(RunOutcome::Failed("stage died".into()), "x"))
                .unwrap();
        assert_eq!(value["error"], "stage died");
    }
}

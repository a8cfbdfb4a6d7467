pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::essays::handlers as essay_handlers;
use crate::recommend::handlers as recommend_handlers;
use crate::state::AppState;
use crate::suggestions::handlers as suggestion_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation pipelines
        .route(
            "/api/v1/recommendations/college-list/:student_id",
            post(recommend_handlers::generate_college_list),
        )
        .route(
            "/api/v1/recommendations/activities/:student_id",
            post(recommend_handlers::generate_activity_recommendations),
        )
        // Essay pipelines
        .route(
            "/api/v1/essays/brainstorm",
            post(essay_handlers::generate_essay_ideas),
        )
        .route(
            "/api/v1/essays/feedback",
            post(essay_handlers::generate_essay_feedback),
        )
        // Essay threads
        .route(
            "/api/v1/essays/threads/:student_id",
            get(essay_handlers::list_threads),
        )
        .route(
            "/api/v1/essays/threads/:student_id/:thread_id",
            get(essay_handlers::get_thread).delete(essay_handlers::delete_thread),
        )
        // Suggestion store
        .route(
            "/api/v1/suggestions/:student_id/current",
            get(suggestion_handlers::current_suggestions),
        )
        .route(
            "/api/v1/suggestions/:student_id/past",
            get(suggestion_handlers::past_suggestions),
        )
        .route(
            "/api/v1/suggestions/:student_id/target",
            post(suggestion_handlers::add_target),
        )
        .route(
            "/api/v1/suggestions/:student_id",
            delete(suggestion_handlers::delete_suggestion),
        )
        // Target lists
        .route(
            "/api/v1/students/:student_id/target-colleges",
            get(suggestion_handlers::target_colleges),
        )
        .route(
            "/api/v1/students/:student_id/target-activities",
            get(suggestion_handlers::target_activities),
        )
        .with_state(state)
}

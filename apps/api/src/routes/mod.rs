pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth_handlers;
use crate::candidates::handlers as candidate_handlers;
use crate::interview::handlers as interview_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Credential store
        .route("/api/v1/auth/register", post(auth_handlers::handle_register))
        .route("/api/v1/auth/login", post(auth_handlers::handle_login))
        // Candidate profiles
        .route(
            "/api/v1/candidates",
            post(candidate_handlers::handle_create_profile),
        )
        .route(
            "/api/v1/candidates/:user_id",
            get(candidate_handlers::handle_get_profile)
                .put(candidate_handlers::handle_update_profile)
                .delete(candidate_handlers::handle_delete_profile),
        )
        // Interview lifecycle
        .route(
            "/api/v1/interviews/:user_id/start",
            post(interview_handlers::handle_start),
        )
        .route(
            "/api/v1/interviews/:user_id/reply",
            post(interview_handlers::handle_reply),
        )
        .route(
            "/api/v1/interviews/:user_id/confirm-end",
            post(interview_handlers::handle_confirm_end),
        )
        .route(
            "/api/v1/interviews/:user_id/decline-end",
            post(interview_handlers::handle_decline_end),
        )
        .route(
            "/api/v1/interviews/:user_id",
            get(interview_handlers::handle_get_record),
        )
        .with_state(state)
}

pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::intake::handlers as intake;
use crate::matching::handlers as matching;
use crate::records::handlers as records;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form pages
        .route("/api/v1/postings", post(records::handle_create_posting))
        .route("/api/v1/profiles", post(records::handle_create_profile))
        // Intake chat
        .route(
            "/api/v1/intake/sessions",
            post(intake::handle_create_session),
        )
        .route(
            "/api/v1/intake/sessions/:id",
            get(intake::handle_get_session),
        )
        .route(
            "/api/v1/intake/sessions/:id/events",
            post(intake::handle_event),
        )
        .route(
            "/api/v1/intake/sessions/:id/attachments",
            post(intake::handle_attachment),
        )
        .route(
            "/api/v1/intake/sessions/:id/agent-reply",
            post(intake::handle_agent_reply),
        )
        .route(
            "/api/v1/intake/sessions/:id/resolve",
            post(intake::handle_resolve_thinking),
        )
        .route(
            "/api/v1/intake/sessions/:id/categories/:name/progress",
            put(intake::handle_set_progress),
        )
        // Admin matchmaking
        .route("/api/v1/matchmaking/run", post(matching::handle_run))
        .route(
            "/api/v1/matchmaking/results",
            get(matching::handle_results),
        )
        .with_state(state)
}

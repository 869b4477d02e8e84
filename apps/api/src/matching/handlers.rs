//! Axum route handlers for the Matchmaking API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::matching::runner::{MatchReport, RunOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub running: bool,
    pub report: Option<MatchReport>,
}

/// POST /api/v1/matchmaking/run
///
/// Runs matchmaking to completion and returns the normalized result. While a run is
/// already in flight this returns 202 with `{"status": "in_progress"}` and sends nothing.
pub async fn handle_run(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<RunOutcome>), AppError> {
    let outcome = state.matchmaking.run().await?;
    let status = match outcome {
        RunOutcome::Completed { .. } => StatusCode::OK,
        RunOutcome::InProgress => StatusCode::ACCEPTED,
    };
    Ok((status, Json(outcome)))
}

/// GET /api/v1/matchmaking/results
pub async fn handle_results(State(state): State<AppState>) -> Json<ResultsResponse> {
    Json(ResultsResponse {
        running: state.matchmaking.is_running(),
        report: state.matchmaking.last_report().await,
    })
}

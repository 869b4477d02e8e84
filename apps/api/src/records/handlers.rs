//! Axum route handlers for the posting and profile forms.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::records::{to_raw_record, Collection, PostingInput, ProfileInput};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InsertResponse {
    pub collection: Collection,
    pub status: &'static str,
}

/// POST /api/v1/postings
pub async fn handle_create_posting(
    State(state): State<AppState>,
    Json(input): Json<PostingInput>,
) -> Result<(StatusCode, Json<InsertResponse>), AppError> {
    require_field("title", &input.title)?;
    require_field("company", &input.company)?;

    state
        .records
        .insert(Collection::Postings, to_raw_record(&input))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InsertResponse {
            collection: Collection::Postings,
            status: "created",
        }),
    ))
}

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(input): Json<ProfileInput>,
) -> Result<(StatusCode, Json<InsertResponse>), AppError> {
    require_field("name", &input.name)?;

    state
        .records
        .insert(Collection::Profiles, to_raw_record(&input))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InsertResponse {
            collection: Collection::Profiles,
            status: "created",
        }),
    ))
}

fn require_field(name: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} cannot be empty")));
    }
    Ok(())
}

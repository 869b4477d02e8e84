//! Axum route handlers for the Intake API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::conversation::FileHandle;
use crate::intake::coordinator::{EventOutcome, IntakeEvent};
use crate::intake::view::IntakeView;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub outcome: EventOutcome,
    pub view: IntakeView,
}

#[derive(Debug, Deserialize)]
pub struct AgentReplyRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: i64,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub category: String,
    pub progress: u8,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/intake/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<IntakeView>) {
    (StatusCode::CREATED, Json(state.intake.create().await))
}

/// GET /api/v1/intake/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<IntakeView>, AppError> {
    let (_, view) = state
        .intake
        .with_session(session_id, |_| ())
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(view))
}

/// POST /api/v1/intake/sessions/:id/events
///
/// Delivers one raw UI event. Guarded actions that do not apply come back as
/// `rejected` with a reason; the session is unchanged in that case.
pub async fn handle_event(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(event): Json<IntakeEvent>,
) -> Result<Json<EventResponse>, AppError> {
    let (outcome, view) = state
        .intake
        .with_session(session_id, |coordinator| coordinator.handle(event))
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(EventResponse { outcome, view }))
}

/// POST /api/v1/intake/sessions/:id/attachments
///
/// File-picker upload. Only the first file part is used; its bytes are discarded
/// because CV text extraction is not performed.
pub async fn handle_attachment(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<EventResponse>, AppError> {
    let file = read_file_part(&mut multipart).await?;
    let (outcome, view) = state
        .intake
        .with_session(session_id, |coordinator| {
            coordinator.handle(IntakeEvent::FileSelected { file })
        })
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(EventResponse { outcome, view }))
}

/// POST /api/v1/intake/sessions/:id/agent-reply
///
/// Appends the reply as-is, even when blank, and clears the thinking flag.
pub async fn handle_agent_reply(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AgentReplyRequest>,
) -> Result<Json<IntakeView>, AppError> {
    let (_, view) = state
        .intake
        .with_session(session_id, |coordinator| {
            coordinator.receive_agent_reply(request.content)
        })
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(view))
}

/// POST /api/v1/intake/sessions/:id/resolve
pub async fn handle_resolve_thinking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<IntakeView>, AppError> {
    let (_, view) = state
        .intake
        .with_session(session_id, |coordinator| coordinator.resolve_thinking())
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    Ok(Json(view))
}

/// PUT /api/v1/intake/sessions/:id/categories/:name/progress
pub async fn handle_set_progress(
    State(state): State<AppState>,
    Path((session_id, category)): Path<(Uuid, String)>,
    Json(request): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>, AppError> {
    let (result, _) = state
        .intake
        .with_session(session_id, |coordinator| {
            coordinator.set_progress(&category, request.progress)
        })
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    let progress =
        result.map_err(|_| AppError::NotFound(format!("Category '{category}' not found")))?;
    Ok(Json(ProgressResponse { category, progress }))
}

async fn read_file_part(multipart: &mut Multipart) -> Result<FileHandle, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
        let mut file = FileHandle::new(name, content_type);
        file.size = Some(bytes.len() as u64);
        return Ok(file);
    }
    Err(AppError::Validation("upload contains no file".to_string()))
}

fn session_not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Intake session {session_id} not found"))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::candidates::store as candidate_store;
use crate::errors::AppError;
use crate::interview::session::{InterviewSession, ReplyOutcome, SessionState};
use crate::interview::store;
use crate::models::interview::InterviewRecordRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub interviewer_message: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub record: InterviewRecordRow,
}

/// POST /api/v1/interviews/:user_id/start
/// Opens a fresh session for a candidate with a stored profile. A candidate
/// with a persisted interview record never gets a second interview.
pub async fn handle_start(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<(StatusCode, Json<StartResponse>), AppError> {
    let profile = candidate_store::load_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No candidate profile for user {user_id}")))?;

    if store::load_session_record(&state.db, user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "This candidate has already completed an interview".to_string(),
        ));
    }
    if state.sessions.get(user_id).await.is_some() {
        return Err(AppError::Conflict(
            "An interview is already in progress for this candidate".to_string(),
        ));
    }

    let mut session = InterviewSession::new(profile);
    let opening = session.begin(state.llm.as_ref()).await?;
    // The insert is conditional: if a concurrent start won the race since
    // the check above, the existing session is kept and this one discarded.
    if !state.sessions.insert_if_absent(user_id, session).await {
        return Err(AppError::Conflict(
            "An interview is already in progress for this candidate".to_string(),
        ));
    }

    info!("Interview started for user {user_id}");
    Ok((
        StatusCode::CREATED,
        Json(StartResponse {
            interviewer_message: opening,
        }),
    ))
}

/// POST /api/v1/interviews/:user_id/reply
/// One conversational turn. The per-session lock serializes turns: a turn
/// fully completes (oracle call + append) before the next is accepted.
pub async fn handle_reply(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<ReplyOutcome>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation(
            "Reply must not be empty.".to_string(),
        ));
    }

    let session = state
        .sessions
        .get(user_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No active interview for user {user_id}")))?;

    let mut session = session.lock().await;
    let outcome = session
        .submit_candidate_reply(state.llm.as_ref(), &req.message)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/interviews/:user_id/confirm-end
/// Terminates the session, runs the evaluation scorer once, and persists
/// the record. A failed scoring or save leaves the session `Ended` but
/// unpersisted, and this endpoint can be called again to retry. The session
/// caches the first successful evaluation, so a retry after a failed save
/// repeats only the save — the scorer is never consulted twice.
pub async fn handle_confirm_end(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let session = state
        .sessions
        .get(user_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No active interview for user {user_id}")))?;

    let mut session = session.lock().await;
    match session.state() {
        SessionState::EndingConfirmation => session.confirm_end()?,
        // Retry path: a previous confirm already ended the session but
        // scoring or persistence failed before a row was written.
        SessionState::Ended => {}
        SessionState::Active => {
            return Err(AppError::Conflict(
                "The interview is not awaiting end confirmation".to_string(),
            ))
        }
    }

    if let Some(existing) = store::load_session_record(&state.db, user_id).await? {
        state.sessions.remove(user_id).await;
        return Ok(Json(TranscriptResponse { record: existing }));
    }

    let evaluation = session.evaluate(state.llm.as_ref()).await?;
    let record = store::save_session_record(
        &state.db,
        user_id,
        session.history(),
        &session.topics_covered(),
        &evaluation,
    )
    .await?;

    drop(session);
    state.sessions.remove(user_id).await;

    info!("Interview completed and recorded for user {user_id}");
    Ok(Json(TranscriptResponse { record }))
}

/// POST /api/v1/interviews/:user_id/decline-end
pub async fn handle_decline_end(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state
        .sessions
        .get(user_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No active interview for user {user_id}")))?;

    let mut session = session.lock().await;
    session.decline_end()?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/interviews/:user_id
/// Read-only replay of the persisted record.
pub async fn handle_get_record(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, AppError> {
    let record = store::load_session_record(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No interview record for user {user_id}")))?;
    Ok(Json(TranscriptResponse { record }))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::candidates::store;
use crate::candidates::validation::{split_tech_stack, validate_intake};
use crate::errors::AppError;
use crate::models::candidate::CandidateProfile;
use crate::state::AppState;

/// Intake form payload. `tech_stack` arrives as the raw comma-separated
/// string the candidate typed; splitting happens server-side.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub experience_years: i32,
    pub experience_months: i32,
    pub desired_position: String,
    pub location: String,
    pub tech_stack: String,
}

impl ProfileRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_intake(
            &self.full_name,
            &self.email,
            &self.phone,
            &self.desired_position,
            &self.location,
            &self.tech_stack,
        )
        .map_err(AppError::Validation)?;

        if self.experience_years < 0 {
            return Err(AppError::Validation(
                "Years of experience must not be negative.".to_string(),
            ));
        }
        if !(0..=11).contains(&self.experience_months) {
            return Err(AppError::Validation(
                "Months of experience must be between 0 and 11.".to_string(),
            ));
        }
        Ok(())
    }
}

/// POST /api/v1/candidates
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(req): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<CandidateProfile>), AppError> {
    req.validate()?;

    let profile = CandidateProfile {
        user_id: req.user_id,
        full_name: req.full_name,
        email: req.email,
        phone: req.phone,
        experience_years: req.experience_years,
        experience_months: req.experience_months,
        desired_position: req.desired_position,
        location: req.location,
        tech_stack: split_tech_stack(&req.tech_stack),
        consent_timestamp: Utc::now(),
    };

    store::save_profile(&state.db, &profile).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/candidates/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<CandidateProfile>, AppError> {
    let profile = store::load_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No candidate profile for user {user_id}")))?;
    Ok(Json(profile))
}

/// PUT /api/v1/candidates/:user_id
/// Full replace by the owning candidate; consent timestamp is immutable.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<CandidateProfile>, AppError> {
    req.validate()?;

    let existing = store::load_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No candidate profile for user {user_id}")))?;

    let profile = CandidateProfile {
        user_id,
        full_name: req.full_name,
        email: req.email,
        phone: req.phone,
        experience_years: req.experience_years,
        experience_months: req.experience_months,
        desired_position: req.desired_position,
        location: req.location,
        tech_stack: split_tech_stack(&req.tech_stack),
        consent_timestamp: existing.consent_timestamp,
    };

    store::update_profile(&state.db, &profile).await?;
    Ok(Json(profile))
}

/// DELETE /api/v1/candidates/:user_id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    store::delete_profile(&state.db, user_id).await?;
    state.sessions.remove(user_id).await;
    Ok(StatusCode::NO_CONTENT)
}

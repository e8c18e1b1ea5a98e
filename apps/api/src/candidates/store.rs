use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateProfile;

/// Persists a freshly validated profile. Fails with `Conflict` if the user
/// already has a profile or the email is taken.
pub async fn save_profile(pool: &PgPool, profile: &CandidateProfile) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO candidates
            (user_id, full_name, email, phone, experience_years, experience_months,
             desired_position, location, tech_stack, consent_timestamp)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(profile.user_id)
    .bind(&profile.full_name)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(profile.experience_years)
    .bind(profile.experience_months)
    .bind(&profile.desired_position)
    .bind(&profile.location)
    .bind(&profile.tech_stack)
    .bind(profile.consent_timestamp)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

pub async fn load_profile(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<CandidateProfile>, AppError> {
    let profile = sqlx::query_as("SELECT * FROM candidates WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

/// Full replacement of every amendable field. `consent_timestamp` is set
/// once at creation and never rewritten.
pub async fn update_profile(pool: &PgPool, profile: &CandidateProfile) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE candidates
        SET full_name = $2, email = $3, phone = $4, experience_years = $5,
            experience_months = $6, desired_position = $7, location = $8,
            tech_stack = $9
        WHERE user_id = $1
        "#,
    )
    .bind(profile.user_id)
    .bind(&profile.full_name)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(profile.experience_years)
    .bind(profile.experience_months)
    .bind(&profile.desired_position)
    .bind(&profile.location)
    .bind(&profile.tech_stack)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "No candidate profile for user {}",
            profile.user_id
        )));
    }
    Ok(())
}

pub async fn delete_profile(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM candidates WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "No candidate profile for user {user_id}"
        )));
    }
    Ok(())
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(d) if d.is_unique_violation() => {
            AppError::Conflict("A profile already exists for this user or email".to_string())
        }
        _ => AppError::Database(e),
    }
}

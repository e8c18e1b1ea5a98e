use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::scoring::EvaluationRecord;
use crate::interview::session::Turn;
use crate::models::interview::InterviewRecordRow;

/// Persists the durable record of one completed interview. At most one row
/// per user — the UNIQUE constraint backs the "never a second interview"
/// rule if two confirms race.
pub async fn save_session_record(
    pool: &PgPool,
    user_id: Uuid,
    history: &[Turn],
    topics_covered: &[String],
    evaluation: &EvaluationRecord,
) -> Result<InterviewRecordRow, AppError> {
    let history_json =
        serde_json::to_value(history).context("Failed to serialize conversation history")?;
    let evaluation_json =
        serde_json::to_value(evaluation).context("Failed to serialize evaluation")?;

    let row = sqlx::query_as(
        r#"
        INSERT INTO interviews (id, user_id, conversation_history, topics_covered, evaluation)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(history_json)
    .bind(topics_covered)
    .bind(evaluation_json)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(d) if d.is_unique_violation() => AppError::Conflict(
            "An interview record already exists for this candidate".to_string(),
        ),
        _ => AppError::Database(e),
    })?;

    Ok(row)
}

pub async fn load_session_record(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<InterviewRecordRow>, AppError> {
    let row = sqlx::query_as("SELECT * FROM interviews WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

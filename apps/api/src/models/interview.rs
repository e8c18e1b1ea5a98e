use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The persisted snapshot of one completed interview: full transcript,
/// supplementary topic-coverage signal, and the evaluation produced at
/// termination. One row per candidate — a finished transcript is immutable
/// and a second interview is never started for the same user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub conversation_history: Value,
    pub topics_covered: Vec<String>,
    pub evaluation: Value,
    pub created_at: DateTime<Utc>,
}

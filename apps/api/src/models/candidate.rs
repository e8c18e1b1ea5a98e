use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Static data describing one candidate. Created at intake, amended only by
/// full replace, never mutated by the interview itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateProfile {
    /// Durable id of the authenticated user who owns this profile.
    /// Interview records are keyed by this, not by email, so profile edits
    /// never orphan them.
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub experience_years: i32,
    /// 0..=11, enforced at intake.
    pub experience_months: i32,
    pub desired_position: String,
    pub location: String,
    /// Entry order preserved as entered; duplicates are not deduplicated.
    pub tech_stack: Vec<String>,
    /// Set once at creation; survives profile replacement unchanged.
    pub consent_timestamp: DateTime<Utc>,
}

impl CandidateProfile {
    /// Display form of declared experience, e.g. "4 years, 6 months".
    pub fn experience_display(&self) -> String {
        format!(
            "{} years, {} months",
            self.experience_years, self.experience_months
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_display() {
        let profile = CandidateProfile {
            user_id: Uuid::new_v4(),
            full_name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            phone: "1234567890".to_string(),
            experience_years: 4,
            experience_months: 6,
            desired_position: "Engineer".to_string(),
            location: "NY".to_string(),
            tech_stack: vec!["Python".to_string()],
            consent_timestamp: Utc::now(),
        };
        assert_eq!(profile.experience_display(), "4 years, 6 months");
    }
}

//! In-memory registry of live interview sessions, one per candidate.
//!
//! This replaces the ambient page/session variables of a form UI with an
//! explicit handle passed between request handlers. Each session sits behind
//! its own async mutex so one conversational turn fully completes before the
//! next is accepted; independent candidates proceed concurrently.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::interview::session::InterviewSession;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Arc<Mutex<InterviewSession>>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session only when the candidate has none. Returns false
    /// and leaves the existing entry untouched when one is already live, so
    /// two racing starts cannot clobber each other's session.
    pub async fn insert_if_absent(&self, user_id: Uuid, session: InterviewSession) -> bool {
        match self.inner.write().await.entry(user_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(session)));
                true
            }
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Option<Arc<Mutex<InterviewSession>>> {
        self.inner.read().await.get(&user_id).cloned()
    }

    pub async fn remove(&self, user_id: Uuid) {
        self.inner.write().await.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::CandidateProfile;
    use chrono::Utc;

    fn make_session() -> InterviewSession {
        InterviewSession::new(CandidateProfile {
            user_id: Uuid::new_v4(),
            full_name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            phone: "1234567890".to_string(),
            experience_years: 1,
            experience_months: 0,
            desired_position: "Engineer".to_string(),
            location: "NY".to_string(),
            tech_stack: vec!["Python".to_string()],
            consent_timestamp: Utc::now(),
        })
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();

        assert!(registry.get(user_id).await.is_none());
        assert!(registry.insert_if_absent(user_id, make_session()).await);
        assert!(registry.get(user_id).await.is_some());
        registry.remove(user_id).await;
        assert!(registry.get(user_id).await.is_none());
    }

    #[tokio::test]
    async fn test_second_insert_for_same_user_keeps_the_first_session() {
        let registry = SessionRegistry::new();
        let user_id = Uuid::new_v4();

        assert!(registry.insert_if_absent(user_id, make_session()).await);
        let original = registry.get(user_id).await.unwrap();

        assert!(!registry.insert_if_absent(user_id, make_session()).await);
        let kept = registry.get(user_id).await.unwrap();
        assert!(Arc::ptr_eq(&original, &kept));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_per_user() {
        let registry = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(registry.insert_if_absent(a, make_session()).await);
        assert!(registry.get(b).await.is_none());
    }
}

//! Interview Session — the state machine that owns one candidate's
//! conversation, decides when to offer termination, and guards the
//! confirm/decline lifecycle.
//!
//! The LLM is an opaque oracle behind `TextGenerator`: it writes every
//! interviewer message and casts the end-of-interview verdict. This module
//! only does bookkeeping around it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::interview::prompts;
use crate::interview::scoring::{self, EvaluationRecord};
use crate::llm_client::{ChatMessage, TextGenerator};
use crate::models::candidate::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

/// One entry in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    EndingConfirmation,
    Ended,
}

/// What a completed conversational turn produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyOutcome {
    pub interviewer_message: String,
    /// True when the session just entered `EndingConfirmation` and the UI
    /// must ask the candidate whether to end.
    pub awaiting_end_confirmation: bool,
}

pub struct InterviewSession {
    profile: CandidateProfile,
    history: Vec<Turn>,
    topics_covered: HashSet<String>,
    state: SessionState,
    evaluation: Option<EvaluationRecord>,
}

impl InterviewSession {
    pub fn new(profile: CandidateProfile) -> Self {
        Self {
            profile,
            history: Vec::new(),
            topics_covered: HashSet::new(),
            state: SessionState::Active,
            evaluation: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.profile
    }

    /// Covered topics in stable order for display. Supplementary signal
    /// only — never consulted for termination; the oracle end-check is
    /// authoritative.
    pub fn topics_covered(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.topics_covered.iter().cloned().collect();
        topics.sort();
        topics
    }

    /// Opens the interview: one generation call producing the leading
    /// interviewer greeting/question. History must still be empty.
    pub async fn begin(&mut self, oracle: &dyn TextGenerator) -> Result<String, AppError> {
        if self.state != SessionState::Active || !self.history.is_empty() {
            return Err(AppError::Conflict(
                "The interview has already started".to_string(),
            ));
        }

        let system = prompts::interviewer_system(&self.profile);
        let opening = oracle
            .generate(&system, &[ChatMessage::user(prompts::OPENING_NUDGE)])
            .await
            .map_err(|e| AppError::Llm(format!("Failed to open the interview: {e}")))?;

        self.history.push(Turn {
            speaker: Speaker::Interviewer,
            text: opening.clone(),
        });
        Ok(opening)
    }

    /// One conversational turn: append the candidate reply, generate the
    /// interviewer's next message over the full history, then consult the
    /// end-check. A generation failure is recovered locally with a fallback
    /// interviewer turn — the session never crashes or changes state on an
    /// oracle error.
    pub async fn submit_candidate_reply(
        &mut self,
        oracle: &dyn TextGenerator,
        text: &str,
    ) -> Result<ReplyOutcome, AppError> {
        if self.state != SessionState::Active {
            return Err(AppError::Conflict(
                "The interview is not accepting replies".to_string(),
            ));
        }

        self.history.push(Turn {
            speaker: Speaker::Candidate,
            text: text.to_string(),
        });
        self.mark_covered_topics(text);

        let system = prompts::interviewer_system(&self.profile);
        let messages = self.chat_messages();

        let interviewer_message = match oracle.generate(&system, &messages).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Generation failed mid-interview, substituting fallback: {e}");
                self.history.push(Turn {
                    speaker: Speaker::Interviewer,
                    text: prompts::FALLBACK_MESSAGE.to_string(),
                });
                return Ok(ReplyOutcome {
                    interviewer_message: prompts::FALLBACK_MESSAGE.to_string(),
                    awaiting_end_confirmation: false,
                });
            }
        };

        self.history.push(Turn {
            speaker: Speaker::Interviewer,
            text: interviewer_message.clone(),
        });

        if self.should_end(oracle).await {
            self.state = SessionState::EndingConfirmation;
        }

        Ok(ReplyOutcome {
            interviewer_message,
            awaiting_end_confirmation: self.state == SessionState::EndingConfirmation,
        })
    }

    /// Binary oracle call deciding whether the latest exchange is complete.
    /// Histories shorter than two turns are never ended and make zero
    /// generation calls. Any failure or non-"yes" verdict means "keep going"
    /// — the interview must never end on an inconclusive signal.
    pub(crate) async fn should_end(&self, oracle: &dyn TextGenerator) -> bool {
        if self.history.len() < 2 {
            return false;
        }

        let interviewer = self.last_text_of(Speaker::Interviewer);
        let candidate = self.last_text_of(Speaker::Candidate);
        let (Some(interviewer), Some(candidate)) = (interviewer, candidate) else {
            return false;
        };

        let system = prompts::end_check_system(interviewer, candidate);
        match oracle
            .generate(&system, &[ChatMessage::user(prompts::END_CHECK_NUDGE)])
            .await
        {
            Ok(verdict) => verdict.trim().to_lowercase() == "yes",
            Err(e) => {
                warn!("End-of-interview check failed, continuing the interview: {e}");
                false
            }
        }
    }

    /// Candidate confirmed ending. Only valid from `EndingConfirmation`;
    /// the caller then scores the transcript and persists the record.
    pub fn confirm_end(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::EndingConfirmation {
            return Err(AppError::Conflict(
                "The interview is not awaiting end confirmation".to_string(),
            ));
        }
        self.state = SessionState::Ended;
        Ok(())
    }

    /// Candidate chose to continue. Returns to `Active` with the history
    /// untouched; no generation call is made — the next reply resumes the
    /// normal cycle.
    pub fn decline_end(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::EndingConfirmation {
            return Err(AppError::Conflict(
                "The interview is not awaiting end confirmation".to_string(),
            ));
        }
        self.state = SessionState::Active;
        Ok(())
    }

    /// Scores the finished transcript. The oracle is consulted at most once
    /// per session: the first successful record is cached, so when a later
    /// persistence attempt fails, a retry reuses the same record instead of
    /// asking the oracle again (which could answer differently).
    pub async fn evaluate(
        &mut self,
        oracle: &dyn TextGenerator,
    ) -> Result<EvaluationRecord, AppError> {
        if self.state != SessionState::Ended {
            return Err(AppError::Conflict(
                "The interview has not ended".to_string(),
            ));
        }
        if let Some(record) = &self.evaluation {
            return Ok(record.clone());
        }
        let record = scoring::score(oracle, &self.history).await?;
        self.evaluation = Some(record.clone());
        Ok(record)
    }

    fn last_text_of(&self, speaker: Speaker) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|t| t.speaker == speaker)
            .map(|t| t.text.as_str())
    }

    /// Case-insensitive substring scan of the reply against the declared
    /// stack. An empty declared tech (from a trailing comma at intake)
    /// matches any reply; that mirrors the intake decision to keep empties.
    fn mark_covered_topics(&mut self, reply: &str) {
        let reply_lower = reply.to_lowercase();
        for tech in &self.profile.tech_stack {
            if reply_lower.contains(&tech.to_lowercase()) {
                self.topics_covered.insert(tech.clone());
            }
        }
    }

    /// Wire view of the history. The conversation must start with a user
    /// message, so the stored interviewer-first transcript is prefixed with
    /// the same nudge used by `begin`.
    fn chat_messages(&self) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::user(prompts::OPENING_NUDGE)];
        for turn in &self.history {
            let message = match turn.speaker {
                Speaker::Interviewer => ChatMessage::assistant(&turn.text),
                Speaker::Candidate => ChatMessage::user(&turn.text),
            };
            messages.push(message);
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::ScriptedOracle;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn make_profile(tech_stack: Vec<&str>) -> CandidateProfile {
        CandidateProfile {
            user_id: Uuid::new_v4(),
            full_name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            phone: "1234567890".to_string(),
            experience_years: 3,
            experience_months: 0,
            desired_position: "Engineer".to_string(),
            location: "NY".to_string(),
            tech_stack: tech_stack.into_iter().map(String::from).collect(),
            consent_timestamp: Utc::now(),
        }
    }

    async fn started_session(oracle: &ScriptedOracle) -> InterviewSession {
        oracle.push_reply("Welcome! Tell me about Python.");
        let mut session = InterviewSession::new(make_profile(vec!["Python", "SQL"]));
        session.begin(oracle).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_begin_appends_single_interviewer_turn() {
        let oracle = ScriptedOracle::new();
        let session = started_session(&oracle).await;
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].speaker, Speaker::Interviewer);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_begin_twice_rejected() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;
        oracle.push_reply("again?");
        assert!(session.begin(&oracle).await.is_err());
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_history_length_is_2n_plus_1_after_n_turns() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;

        for n in 1..=4usize {
            oracle.push_reply(format!("Question {n}"));
            oracle.push_reply("no"); // end-check verdict
            session
                .submit_candidate_reply(&oracle, "An answer about Python")
                .await
                .unwrap();
            assert_eq!(session.history().len(), 2 * n + 1);
        }
    }

    #[tokio::test]
    async fn test_should_end_short_history_makes_no_calls() {
        let oracle = ScriptedOracle::new();
        let session = InterviewSession::new(make_profile(vec!["Python"]));
        assert!(!session.should_end(&oracle).await);
        assert_eq!(oracle.generate_call_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_appends_fallback_and_stays_active() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;
        oracle.push_failure();

        let outcome = session
            .submit_candidate_reply(&oracle, "My answer")
            .await
            .unwrap();

        assert_eq!(outcome.interviewer_message, prompts::FALLBACK_MESSAGE);
        assert!(!outcome.awaiting_end_confirmation);
        assert_eq!(session.state(), SessionState::Active);
        // candidate turn + exactly one fallback interviewer turn
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.history()[2].text, prompts::FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_yes_verdict_enters_ending_confirmation_on_third_exchange() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;

        for verdict in ["no", "no"] {
            oracle.push_reply("Next question");
            oracle.push_reply(verdict);
            let outcome = session
                .submit_candidate_reply(&oracle, "Answer about SQL")
                .await
                .unwrap();
            assert!(!outcome.awaiting_end_confirmation);
            assert_eq!(session.state(), SessionState::Active);
        }

        oracle.push_reply("Thanks, that covers everything.");
        oracle.push_reply("yes");
        let outcome = session
            .submit_candidate_reply(&oracle, "Final answer")
            .await
            .unwrap();
        assert!(outcome.awaiting_end_confirmation);
        assert_eq!(session.state(), SessionState::EndingConfirmation);
    }

    #[tokio::test]
    async fn test_verdict_parsing_is_exact_match_after_trim_lowercase() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;

        // "Yes." is not an exact "yes" and must not end the interview.
        oracle.push_reply("Another question");
        oracle.push_reply("Yes.");
        session
            .submit_candidate_reply(&oracle, "Answer")
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Active);

        // "  YES  " trims and lowercases to an exact match.
        oracle.push_reply("Closing remark");
        oracle.push_reply("  YES  ");
        session
            .submit_candidate_reply(&oracle, "Answer")
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::EndingConfirmation);
    }

    #[tokio::test]
    async fn test_end_check_failure_means_continue() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;

        oracle.push_reply("A question");
        oracle.push_failure(); // end-check transport failure
        let outcome = session
            .submit_candidate_reply(&oracle, "Answer")
            .await
            .unwrap();
        assert!(!outcome.awaiting_end_confirmation);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_confirm_end_from_active_rejected() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;
        assert!(session.confirm_end().is_err());
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_confirm_end_from_ending_confirmation() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;
        oracle.push_reply("Done?");
        oracle.push_reply("yes");
        session
            .submit_candidate_reply(&oracle, "Answer")
            .await
            .unwrap();

        session.confirm_end().unwrap();
        assert_eq!(session.state(), SessionState::Ended);

        // Ended is terminal: no further replies accepted.
        assert!(session
            .submit_candidate_reply(&oracle, "more")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_decline_end_returns_to_active_with_history_unchanged() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;
        oracle.push_reply("Done?");
        oracle.push_reply("yes");
        session
            .submit_candidate_reply(&oracle, "Answer")
            .await
            .unwrap();
        let len_before = session.history().len();
        let calls_before = oracle.generate_call_count();

        session.decline_end().unwrap();

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.history().len(), len_before);
        assert_eq!(oracle.generate_call_count(), calls_before);
    }

    async fn ended_session(oracle: &ScriptedOracle) -> InterviewSession {
        let mut session = started_session(oracle).await;
        oracle.push_reply("Thanks, that covers everything.");
        oracle.push_reply("yes");
        session
            .submit_candidate_reply(oracle, "Final answer")
            .await
            .unwrap();
        session.confirm_end().unwrap();
        session
    }

    fn evaluation_payload() -> serde_json::Value {
        json!({
            "overall_sentiment": "positive",
            "key_strengths": ["clear explanations"],
            "areas_for_improvement": ["more depth"],
            "technical_confidence_score": 8,
            "communication_score": 7
        })
    }

    #[tokio::test]
    async fn test_evaluate_scores_the_oracle_at_most_once() {
        let oracle = ScriptedOracle::new();
        let mut session = ended_session(&oracle).await;

        oracle.push_structured(evaluation_payload());
        let first = session.evaluate(&oracle).await.unwrap();

        // A retry after a failed save must reuse the cached record with no
        // further structured calls.
        let second = session.evaluate(&oracle).await.unwrap();
        assert_eq!(oracle.structured_call_count(), 1);
        assert_eq!(
            first.technical_confidence_score,
            second.technical_confidence_score
        );
        assert_eq!(first.key_strengths, second.key_strengths);
    }

    #[tokio::test]
    async fn test_evaluate_failure_caches_nothing() {
        let oracle = ScriptedOracle::new();
        let mut session = ended_session(&oracle).await;

        oracle.push_structured_failure();
        assert!(session.evaluate(&oracle).await.is_err());

        oracle.push_structured(evaluation_payload());
        let record = session.evaluate(&oracle).await.unwrap();
        assert_eq!(record.communication_score, 7);
        assert_eq!(oracle.structured_call_count(), 2);
    }

    #[tokio::test]
    async fn test_evaluate_before_ended_rejected() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;
        assert!(session.evaluate(&oracle).await.is_err());
        assert_eq!(oracle.structured_call_count(), 0);
    }

    #[tokio::test]
    async fn test_decline_end_from_active_rejected() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;
        assert!(session.decline_end().is_err());
    }

    #[tokio::test]
    async fn test_topic_coverage_is_case_insensitive_substring() {
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;

        oracle.push_reply("Next question");
        oracle.push_reply("no");
        session
            .submit_candidate_reply(&oracle, "I use PYTHON daily for ETL work")
            .await
            .unwrap();

        assert_eq!(session.topics_covered(), vec!["Python".to_string()]);
    }

    #[tokio::test]
    async fn test_topic_coverage_never_forces_termination() {
        // Both declared topics covered, but the oracle keeps saying "no":
        // coverage is displayed-only and the verdict is authoritative.
        let oracle = ScriptedOracle::new();
        let mut session = started_session(&oracle).await;

        oracle.push_reply("Next question");
        oracle.push_reply("no");
        session
            .submit_candidate_reply(&oracle, "I know Python and SQL well")
            .await
            .unwrap();

        assert_eq!(session.topics_covered().len(), 2);
        assert_eq!(session.state(), SessionState::Active);
    }
}

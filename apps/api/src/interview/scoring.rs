//! Evaluation Scorer — turns a finished transcript into a fixed-shape
//! sentiment record via one schema-constrained oracle call.
//!
//! Contract violations (missing field, out-of-range score, oversized array)
//! are hard errors: a partial evaluation is worse than none, so nothing is
//! default-filled and nothing partial reaches the store.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::prompts::{sentiment_system, SENTIMENT_PROMPT_TEMPLATE};
use crate::interview::session::{Speaker, Turn};
use crate::llm_client::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// The evaluation attached 1:1 to a completed interview. Immutable once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub overall_sentiment: Sentiment,
    pub key_strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub technical_confidence_score: u8,
    pub communication_score: u8,
    /// Heuristic flag for suspiciously fast, over-detailed, possibly
    /// AI-generated answers. Optional in the oracle contract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_authenticity_score: Option<u8>,
}

/// Scores a finished transcript. Exactly one structured generation call;
/// the reply must satisfy the full contract or the attempt fails.
pub async fn score(
    oracle: &dyn TextGenerator,
    history: &[Turn],
) -> Result<EvaluationRecord, AppError> {
    let transcript = render_transcript(history);
    let prompt = SENTIMENT_PROMPT_TEMPLATE.replace("{transcript}", &transcript);

    let payload = oracle
        .generate_structured(&sentiment_system(), &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Sentiment analysis failed: {e}")))?;

    let record: EvaluationRecord = serde_json::from_value(payload)
        .map_err(|e| AppError::Llm(format!("Evaluation contract violation: {e}")))?;

    check_contract(&record)
        .map_err(|reason| AppError::Llm(format!("Evaluation contract violation: {reason}")))?;

    Ok(record)
}

fn check_contract(record: &EvaluationRecord) -> Result<(), String> {
    if record.key_strengths.len() > 3 {
        return Err(format!(
            "key_strengths has {} entries, at most 3 allowed",
            record.key_strengths.len()
        ));
    }
    if record.areas_for_improvement.len() > 3 {
        return Err(format!(
            "areas_for_improvement has {} entries, at most 3 allowed",
            record.areas_for_improvement.len()
        ));
    }
    for (name, value) in [
        ("technical_confidence_score", record.technical_confidence_score),
        ("communication_score", record.communication_score),
    ] {
        if value > 10 {
            return Err(format!("{name} is {value}, must be in 0..=10"));
        }
    }
    if let Some(value) = record.conversation_authenticity_score {
        if value > 10 {
            return Err(format!(
                "conversation_authenticity_score is {value}, must be in 0..=10"
            ));
        }
    }
    Ok(())
}

fn render_transcript(history: &[Turn]) -> String {
    history
        .iter()
        .map(|turn| {
            let speaker = match turn.speaker {
                Speaker::Interviewer => "Interviewer",
                Speaker::Candidate => "Candidate",
            };
            format!("{speaker}: {}", turn.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

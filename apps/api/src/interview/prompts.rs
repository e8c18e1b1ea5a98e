// All LLM prompt constants for the Interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::models::candidate::CandidateProfile;

/// Interviewer system directive template.
/// Replace `{desired_position}`, `{experience}`, `{tech_stack}` before sending.
pub const INTERVIEWER_SYSTEM_TEMPLATE: &str = "You are an AI technical interviewer conducting a screening interview for a {desired_position} position.
The candidate has {experience} of experience and expertise in: {tech_stack}.
First you need to check if the expertise mentioned are relevant to the position, it may be some random words.
If not a relevant skill, inform the candidate the same and move to the next relevant skill.

And if it is a relevant skill:
1. Ask relevant technical questions about each technology in their stack
2. Ask follow-up questions based on their responses, limiting follow-ups to 1-3 questions per topic
3. Transition to the next topic once follow-ups are exhausted or answers are complete or the candidate has no proper answer to the question
4. Keep track of topics covered
5. End the conversation gracefully once all topics are covered
6. Stay focused on technical assessment

Guidelines:
- Ask one question at a time
- Follow up on interesting points in their answers
- If an answer is unclear, ask for clarification
- Keep questions relevant to their experience level
- Be professional but friendly
- Mark topics as covered when sufficiently discussed

Start by introducing yourself and asking the first technical question.";

/// First user-role message sent with the opening generation call. The wire
/// format requires the conversation to start with a user message; this nudge
/// is a transport detail and is never stored in the session history.
pub const OPENING_NUDGE: &str = "Hello, I'm ready to begin the interview.";

/// End-of-interview classification directive. Only the most recent exchange
/// is submitted — not the whole history — and the verdict is parsed as an
/// exact lower-cased "yes".
/// Replace `{interviewer_message}` and `{candidate_reply}` before sending.
pub const END_CHECK_SYSTEM_TEMPLATE: &str = "You are an AI evaluator assisting in a technical interview.
Your task is to determine if the interview has reached a natural conclusion.
Evaluate the most recent exchange between the interviewer and the candidate:
- Interviewer's question: \"{interviewer_message}\"
- Candidate's response: \"{candidate_reply}\"

Considering the above conversation in isolation:
- check if they are in the middle of any conversation
- does the interviewer have any pending question
- does the candidate have any pending answer

Based on the above, should the interview be ended?
Provide the answer as 'yes' or 'no'.";

/// User-role nudge for the end-check call.
pub const END_CHECK_NUDGE: &str = "Answer with 'yes' or 'no' only.";

/// Sentinel interviewer turn appended when a generation call fails in the
/// conversational path. The session stays active and the candidate retries.
pub const FALLBACK_MESSAGE: &str =
    "I'm sorry, a technical difficulty occurred on our side. Please send your last response again.";

/// System prompt for the post-interview sentiment analysis — the analyst
/// role plus the shared JSON-only enforcement fragment.
pub fn sentiment_system() -> String {
    format!(
        "You are an AI that analyzes interview responses to provide structured sentiment analysis. {}",
        crate::llm_client::prompts::JSON_ONLY_SYSTEM
    )
}

/// Sentiment analysis prompt template. Replace `{transcript}` before sending.
pub const SENTIMENT_PROMPT_TEMPLATE: &str = r#"You will analyze the following interview conversation and provide the sentiment analysis.
Consider the candidate's responses, tone, and engagement during the interview.
Evaluate their strengths, areas for improvement, and scores for technical confidence and communication.
If the responses are minimal or vague, note this explicitly in your analysis — do NOT score them generously.
Also judge conversation authenticity: suspiciously fast, over-detailed, possibly AI-generated answers should lower the authenticity score.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_sentiment": "positive" | "neutral" | "negative",
  "key_strengths": ["at most 3 strings"],
  "areas_for_improvement": ["at most 3 strings"],
  "technical_confidence_score": 0-10 integer,
  "communication_score": 0-10 integer,
  "conversation_authenticity_score": 0-10 integer (optional)
}

Here is the conversation:
{transcript}"#;

/// Builds the interviewer system directive for one candidate.
pub fn interviewer_system(profile: &CandidateProfile) -> String {
    INTERVIEWER_SYSTEM_TEMPLATE
        .replace("{desired_position}", &profile.desired_position)
        .replace("{experience}", &profile.experience_display())
        .replace("{tech_stack}", &profile.tech_stack.join(", "))
}

/// Builds the end-check directive from the latest exchange.
pub fn end_check_system(interviewer_message: &str, candidate_reply: &str) -> String {
    END_CHECK_SYSTEM_TEMPLATE
        .replace("{interviewer_message}", interviewer_message)
        .replace("{candidate_reply}", candidate_reply)
}

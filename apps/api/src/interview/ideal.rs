//! Ideal-answer synthesis — batch-produces reference answers for a
//! session's full question list.
//!
//! The inner loop demands a schema-valid JSON array from the model and
//! gives up after three attempts. The outer wrapper converts any such
//! failure into placeholder pairs, so the operation as a whole never
//! surfaces an error once the session lookup has succeeded. Resume
//! analysis deliberately does NOT share this fallback.
//!
//! Results are recomputed on every request, never persisted: two calls for
//! the same session may produce different reference answers.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::{
    IDEAL_ANSWER_PLACEHOLDER, IDEAL_PARAMS, IDEAL_PROMPT_TEMPLATE, IDEAL_SYSTEM,
};
use crate::llm_client::{strip_json_fences, GenerativeClient};
use crate::store::SessionStore;

/// Hard cap on model invocations per synthesis request.
pub const MAX_SYNTHESIS_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IdealAnswer {
    pub question: String,
    pub ideal_answer: String,
}

/// Synthesizes one reference answer per session question.
///
/// Fails with `NotFound` for unknown/unowned sessions; afterwards it is
/// observably total — a session with N questions always yields exactly N
/// pairs, genuine or placeholder.
pub async fn synthesize_ideal_answers(
    store: &dyn SessionStore,
    llm: &dyn GenerativeClient,
    user_id: Uuid,
    session_id: &str,
) -> Result<Vec<IdealAnswer>, AppError> {
    let session = store
        .get_session(session_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {session_id} not found")))?;

    if session.questions.is_empty() {
        return Ok(Vec::new());
    }

    match synthesize_validated(llm, &session.questions).await {
        Ok(pairs) => {
            info!(
                "Synthesized {} ideal answers for interview {session_id}",
                pairs.len()
            );
            Ok(pairs)
        }
        Err(err) => {
            warn!("Ideal answer synthesis degraded for interview {session_id}: {err}");
            // Re-read the question list and answer every question with the
            // placeholder; the caller sees a normal success.
            let questions = store
                .get_session(session_id, user_id)
                .await?
                .map(|s| s.questions)
                .unwrap_or_default();
            Ok(placeholder_pairs(&questions))
        }
    }
}

/// The validation loop: up to `MAX_SYNTHESIS_ATTEMPTS` calls, each attempt
/// either yields a full array of answers or a rejection reason. No delay
/// between attempts.
async fn synthesize_validated(
    llm: &dyn GenerativeClient,
    questions: &[String],
) -> Result<Vec<IdealAnswer>, AppError> {
    let prompt = build_ideal_prompt(questions);
    let mut last_reason = String::new();

    for attempt in 1..=MAX_SYNTHESIS_ATTEMPTS {
        match attempt_synthesis(llm, &prompt, questions.len()).await {
            Ok(answers) => return Ok(zip_with_placeholders(questions, answers)),
            Err(reason) => {
                warn!(
                    "Ideal answer attempt {attempt}/{MAX_SYNTHESIS_ATTEMPTS} rejected: {reason}"
                );
                last_reason = reason;
            }
        }
    }

    Err(AppError::ValidationFailed(format!(
        "no valid ideal-answer array after {MAX_SYNTHESIS_ATTEMPTS} attempts: {last_reason}"
    )))
}

/// One attempt: call the model, strip fences, parse a string array, check
/// the length. Every failure mode — transport included — reduces to a
/// rejection reason so the loop treats all attempts uniformly.
async fn attempt_synthesis(
    llm: &dyn GenerativeClient,
    prompt: &str,
    expected: usize,
) -> Result<Vec<String>, String> {
    let raw = llm
        .complete(IDEAL_SYSTEM, prompt, IDEAL_PARAMS)
        .await
        .map_err(|e| format!("model call failed: {e}"))?;

    let cleaned = strip_json_fences(&raw);
    let answers: Vec<String> =
        serde_json::from_str(cleaned).map_err(|e| format!("not a JSON string array: {e}"))?;

    if answers.len() != expected {
        return Err(format!(
            "array length {} does not match question count {expected}",
            answers.len()
        ));
    }
    Ok(answers)
}

fn build_ideal_prompt(questions: &[String]) -> String {
    let numbered = questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {q}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    IDEAL_PROMPT_TEMPLATE.replace("{questions}", &numbered)
}

/// Zips questions with answers positionally; an empty answer entry gets the
/// placeholder instead.
fn zip_with_placeholders(questions: &[String], answers: Vec<String>) -> Vec<IdealAnswer> {
    questions
        .iter()
        .zip(answers)
        .map(|(question, answer)| IdealAnswer {
            question: question.clone(),
            ideal_answer: if answer.is_empty() {
                IDEAL_ANSWER_PLACEHOLDER.to_string()
            } else {
                answer
            },
        })
        .collect()
}

fn placeholder_pairs(questions: &[String]) -> Vec<IdealAnswer> {
    questions
        .iter()
        .map(|question| IdealAnswer {
            question: question.clone(),
            ideal_answer: IDEAL_ANSWER_PLACEHOLDER.to_string(),
        })
        .collect()
}

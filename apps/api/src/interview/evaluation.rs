//! Answer evaluation — scores one submitted answer against one question and
//! appends the result to the session's parallel histories.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::{SCORING_PARAMS, SCORING_PROMPT_TEMPLATE, SCORING_SYSTEM};
use crate::llm_client::GenerativeClient;
use crate::store::{AnswerTurn, SessionStore};

/// Scores are recorded on a 0..=10 scale.
const MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct AnswerEvaluation {
    pub feedback: String,
    pub score: u8,
}

/// Evaluates one answer with a single model call and appends
/// answer/score/feedback to the session atomically.
///
/// When the reply carries no recognizable "Score (out of 10):" line, the
/// score silently defaults to 0 and the raw reply still becomes the
/// feedback. Scoring degrades; it does not fail.
pub async fn submit_answer(
    store: &dyn SessionStore,
    llm: &dyn GenerativeClient,
    user_id: Uuid,
    session_id: &str,
    question: &str,
    answer: &str,
) -> Result<AnswerEvaluation, AppError> {
    store
        .get_session(session_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {session_id} not found")))?;

    if answer.trim().is_empty() {
        return Err(AppError::InvalidInput("Answer is required".to_string()));
    }

    let prompt = SCORING_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{answer}", answer);
    let feedback = llm.complete(SCORING_SYSTEM, &prompt, SCORING_PARAMS).await?;

    let score = match extract_score(&feedback) {
        Some(score) => score,
        None => {
            warn!("No score line in evaluation reply for interview {session_id}; defaulting to 0");
            0
        }
    };

    store
        .append_turn(
            session_id,
            user_id,
            AnswerTurn {
                answer: answer.to_string(),
                score,
                feedback: feedback.clone(),
            },
        )
        .await?;

    info!("Recorded answer for interview {session_id} with score {score}");
    Ok(AnswerEvaluation { feedback, score })
}

/// Extracts the integer from a `Score (out of 10): <digits>` line,
/// case-insensitively and tolerant of spacing. Values above 10 are capped
/// so stored scores stay on the 0..=10 scale.
fn extract_score(text: &str) -> Option<u8> {
    let lower = text.to_lowercase();
    for (start, _) in lower.match_indices("score") {
        let rest = lower[start + "score".len()..].trim_start();
        let Some(rest) = rest.strip_prefix("(out of 10)") else {
            continue;
        };
        let Some(rest) = rest.trim_start().strip_prefix(':') else {
            continue;
        };
        let digits: String = rest
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            continue;
        }
        return Some(digits.parse::<u64>().ok()?.min(MAX_SCORE as u64) as u8);
    }
    None
}

// ────────────────────────────────────────────────────────────────────────────
// Session summary
// ────────────────────────────────────────────────────────────────────────────

pub const VERDICT_STRONG: &str = "Strong performance";
pub const VERDICT_AVERAGE: &str = "Average performance";
pub const VERDICT_NEEDS_IMPROVEMENT: &str = "Needs improvement";

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub role: String,
    pub total_questions: usize,
    /// Mean of the recorded scores, rounded to one decimal. 0.0 when no
    /// answers were recorded yet.
    pub average_score: f64,
    pub scores: Vec<u8>,
    pub verdict: &'static str,
}

/// Summarizes a session's recorded scores with a coarse verdict
/// (thresholds 7 and 5 on the average).
pub async fn summarize_session(
    store: &dyn SessionStore,
    user_id: Uuid,
    session_id: &str,
) -> Result<SessionSummary, AppError> {
    let session = store
        .get_session(session_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {session_id} not found")))?;

    let average_score = if session.scores.is_empty() {
        0.0
    } else {
        let total: u32 = session.scores.iter().map(|&s| s as u32).sum();
        let avg = total as f64 / session.scores.len() as f64;
        (avg * 10.0).round() / 10.0
    };

    let verdict = if average_score >= 7.0 {
        VERDICT_STRONG
    } else if average_score >= 5.0 {
        VERDICT_AVERAGE
    } else {
        VERDICT_NEEDS_IMPROVEMENT
    };

    Ok(SessionSummary {
        role: session.role,
        total_questions: session.questions.len(),
        average_score,
        scores: session.scores,
        verdict,
    })
}

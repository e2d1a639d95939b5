//! Resume analysis — produces a structured ATS-style assessment.
//!
//! Same bounded validation loop as ideal-answer synthesis, with the
//! opposite exhaustion policy: when three attempts produce no valid
//! assessment, `ValidationFailed` surfaces to the caller. There is no
//! placeholder result that would be worth persisting as a review.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::GenerativeClient;
use crate::models::review::{ResumeAssessment, ResumeReview};
use crate::resume::prompts::{ANALYSIS_PARAMS, ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::store::SessionStore;

/// Hard cap on model invocations per analysis request.
pub const MAX_ANALYSIS_ATTEMPTS: u32 = 3;

/// Resume text sent to the model is capped at this many characters.
pub const RESUME_TEXT_MAX_CHARS: usize = 4000;

#[derive(Debug, Clone, Serialize)]
pub struct ResumeAnalysisOutcome {
    pub review: ResumeReview,
    pub assessment: ResumeAssessment,
    /// The normalized text that was actually analyzed, returned so the
    /// caller can confirm what the assessment was based on.
    pub extracted_text: String,
}

/// Analyzes extracted resume text against a target role and persists the
/// resulting review.
///
/// The extracted text must already have passed the extraction dispatcher's
/// minimum-length gate; `file_ref` is the handle under which the storage
/// collaborator holds the uploaded artifact.
pub async fn analyze_resume(
    store: &dyn SessionStore,
    llm: &dyn GenerativeClient,
    user_id: Uuid,
    target_role: &str,
    extracted_text: &str,
    file_ref: String,
) -> Result<ResumeAnalysisOutcome, AppError> {
    let target_role = target_role.trim();
    if target_role.is_empty() {
        return Err(AppError::InvalidInput(
            "Target job role is required".to_string(),
        ));
    }

    let normalized = normalize_resume_text(extracted_text);
    let capped: String = normalized.chars().take(RESUME_TEXT_MAX_CHARS).collect();

    let prompt = ANALYSIS_PROMPT_TEMPLATE
        .replace("{target_role}", target_role)
        .replace("{resume}", &capped);

    let assessment = analyze_validated(llm, &prompt).await?;

    let review = ResumeReview::from_assessment(
        user_id,
        target_role.to_string(),
        &assessment,
        file_ref,
    );
    store.create_review(review.clone()).await?;

    info!(
        "Stored resume review {} (ats_score={}) for user {user_id}",
        review.id, review.ats_score
    );
    Ok(ResumeAnalysisOutcome {
        review,
        assessment,
        extracted_text: capped,
    })
}

/// The validation loop: up to `MAX_ANALYSIS_ATTEMPTS` calls; exhaustion is
/// terminal. No delay between attempts.
async fn analyze_validated(
    llm: &dyn GenerativeClient,
    prompt: &str,
) -> Result<ResumeAssessment, AppError> {
    let mut last_reason = String::new();

    for attempt in 1..=MAX_ANALYSIS_ATTEMPTS {
        match attempt_analysis(llm, prompt).await {
            Ok(assessment) => return Ok(assessment),
            Err(reason) => {
                warn!(
                    "Resume analysis attempt {attempt}/{MAX_ANALYSIS_ATTEMPTS} rejected: {reason}"
                );
                last_reason = reason;
            }
        }
    }

    Err(AppError::ValidationFailed(format!(
        "no valid assessment after {MAX_ANALYSIS_ATTEMPTS} attempts: {last_reason}"
    )))
}

/// One attempt: call, slice out the first `{...}` object, parse, range-check
/// the score. All failure modes reduce to a rejection reason.
async fn attempt_analysis(
    llm: &dyn GenerativeClient,
    prompt: &str,
) -> Result<ResumeAssessment, String> {
    let raw = llm
        .complete(ANALYSIS_SYSTEM, prompt, ANALYSIS_PARAMS)
        .await
        .map_err(|e| format!("model call failed: {e}"))?;

    let object = extract_json_object(&raw).ok_or("no JSON object found in reply")?;
    let assessment: ResumeAssessment =
        serde_json::from_str(object).map_err(|e| format!("malformed assessment JSON: {e}"))?;

    if !assessment.score_in_range() {
        return Err(format!(
            "atsScore {} outside 0..=100",
            assessment.ats_score
        ));
    }
    Ok(assessment)
}

/// Returns the substring from the first `{` to the last `}`, the widest
/// candidate for the JSON object buried in a chatty reply.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Collapses runs of spaces/tabs to one space and caps consecutive newlines
/// at two, trimming the ends. Content order is untouched, so inputs that
/// are already normalized pass through unchanged.
pub fn normalize_resume_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    let mut newline_run = 0u32;

    for c in input.chars() {
        match c {
            ' ' | '\t' => pending_space = true,
            '\r' => {}
            '\n' => {
                pending_space = false;
                newline_run += 1;
                if newline_run <= 2 {
                    out.push('\n');
                }
            }
            _ => {
                if pending_space && !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                pending_space = false;
                newline_run = 0;
                out.push(c);
            }
        }
    }

    out.trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use crate::llm_client::testing::ScriptedClient;
    use crate::store::memory::MemoryStore;
    use crate::store::SessionStore;

    use super::*;

    const VALID_REPLY: &str = r#"Here is the analysis you asked for:
{
  "atsScore": 72,
  "keywordsMatched": ["Rust", "PostgreSQL"],
  "missingSkills": ["Kubernetes"],
  "formattingIssues": ["Inconsistent date formats"]
}
Hope this helps!"#;

    const RESUME: &str = "Backend engineer with a decade of experience building storage systems \
        in Rust and operating PostgreSQL clusters at scale.";

    #[test]
    fn test_extract_json_object_widest_span() {
        assert_eq!(extract_json_object("junk {\"a\": 1} trailing"), Some("{\"a\": 1}"));
        assert_eq!(
            extract_json_object("{\"a\": {\"b\": 2}} extra }"),
            Some("{\"a\": {\"b\": 2}} extra }")
        );
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }

    #[test]
    fn test_normalize_collapses_spaces_and_tabs() {
        assert_eq!(
            normalize_resume_text("a  b\t\tc \t d"),
            "a b c d"
        );
    }

    #[test]
    fn test_normalize_caps_newlines_at_two() {
        assert_eq!(
            normalize_resume_text("Header\n\n\n\nBody"),
            "Header\n\nBody"
        );
    }

    #[test]
    fn test_normalize_trims_edges_and_line_boundaries() {
        assert_eq!(
            normalize_resume_text("  line one   \n   line two  "),
            "line one\nline two"
        );
    }

    #[test]
    fn test_normalized_input_round_trips_unchanged() {
        let text = "Jane Doe\nBackend Engineer\n\nBuilt things with Rust and SQL.";
        assert_eq!(normalize_resume_text(text), text);
    }

    #[tokio::test]
    async fn test_analysis_success_persists_review() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Ok(VALID_REPLY));
        let user_id = Uuid::new_v4();

        let outcome = analyze_resume(
            &store,
            &llm,
            user_id,
            "Backend Engineer",
            RESUME,
            "stored.pdf".to_string(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.assessment.ats_score, 72);
        assert_eq!(outcome.assessment.keywords_matched, vec!["Rust", "PostgreSQL"]);
        assert_eq!(outcome.extracted_text, normalize_resume_text(RESUME));
        assert_eq!(llm.calls(), 1);

        let stored = store
            .get_review(&outcome.review.id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.ats_score, 72);
        assert_eq!(stored.target_role, "Backend Engineer");
        assert_eq!(stored.file_ref, "stored.pdf");
    }

    /// Malformed JSON on all three attempts is terminal — no fallback, no
    /// persisted review.
    #[tokio::test]
    async fn test_malformed_json_exhausts_retries_and_fails() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Ok("{\"atsScore\": oops"));
        let user_id = Uuid::new_v4();

        let err = analyze_resume(&store, &llm, user_id, "SRE", RESUME, "f.pdf".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
        assert_eq!(llm.calls(), MAX_ANALYSIS_ATTEMPTS);
        assert!(store.list_reviews(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_discarded() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::sequence(vec![
            Ok(r#"{"atsScore": 140, "keywordsMatched": [], "missingSkills": [], "formattingIssues": []}"#),
            Ok(r#"{"atsScore": 90, "keywordsMatched": [], "missingSkills": [], "formattingIssues": []}"#),
        ]);

        let outcome = analyze_resume(
            &store,
            &llm,
            Uuid::new_v4(),
            "SRE",
            RESUME,
            "f.pdf".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.assessment.ats_score, 90);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_transport_failures_count_as_attempts_and_surface() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Err("model unreachable"));

        let err = analyze_resume(
            &store,
            &llm,
            Uuid::new_v4(),
            "SRE",
            RESUME,
            "f.pdf".to_string(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
        assert_eq!(llm.calls(), MAX_ANALYSIS_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_blank_target_role_is_rejected_before_any_call() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Ok(VALID_REPLY));

        let err = analyze_resume(
            &store,
            &llm,
            Uuid::new_v4(),
            "  ",
            RESUME,
            "f.pdf".to_string(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_long_resume_is_truncated_for_the_prompt() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Ok(VALID_REPLY));
        let long_resume = "word ".repeat(2000); // ~10k chars

        let outcome = analyze_resume(
            &store,
            &llm,
            Uuid::new_v4(),
            "SRE",
            &long_resume,
            "f.pdf".to_string(),
        )
        .await
        .unwrap();
        assert!(outcome.extracted_text.chars().count() <= RESUME_TEXT_MAX_CHARS);
    }
}

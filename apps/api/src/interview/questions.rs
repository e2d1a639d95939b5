//! Question generation — opens an interview session.
//!
//! Either accepts a caller-supplied question list verbatim, or issues one
//! model call and parses the free-text reply into questions. Free-text
//! generation has no validity contract to retry against, so a transport
//! failure here fails the whole operation.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::{
    QUESTION_PARAMS, QUESTION_PROMPT_TEMPLATE, QUESTION_SYSTEM, RESUME_CONTEXT_MAX_CHARS,
    RESUME_QUESTION_PROMPT_TEMPLATE,
};
use crate::llm_client::GenerativeClient;
use crate::models::session::{Difficulty, InterviewSession, SessionType};
use crate::store::SessionStore;

pub const DEFAULT_ROLE: &str = "Software Engineer";
pub const DEFAULT_QUESTION_COUNT: u32 = 3;

/// Question fragments at or below this length are discarded during parsing.
const MIN_QUESTION_CHARS: usize = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub question_count: Option<u32>,
    #[serde(default)]
    pub resume_context: Option<String>,
    /// When non-empty, used verbatim; the model is never invoked.
    #[serde(default)]
    pub preset_questions: Option<Vec<String>>,
    #[serde(default)]
    pub session_type: SessionType,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub questions: Vec<String>,
}

/// Opens a new interview session and returns its id and question list.
///
/// The requested count is a hint embedded into the prompt, not a guarantee;
/// the parsed list may be shorter or longer.
pub async fn start_session(
    store: &dyn SessionStore,
    llm: &dyn GenerativeClient,
    request: StartSessionRequest,
) -> Result<StartSessionResponse, AppError> {
    let role = request
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE)
        .to_string();
    let count = request.question_count.unwrap_or(DEFAULT_QUESTION_COUNT).max(1);

    let questions = match request
        .preset_questions
        .as_deref()
        .filter(|qs| !qs.is_empty())
    {
        Some(preset) => preset.to_vec(),
        None => {
            let prompt = build_question_prompt(
                &role,
                request.difficulty,
                count,
                request.resume_context.as_deref(),
            );
            let text = llm
                .complete(QUESTION_SYSTEM, &prompt, QUESTION_PARAMS)
                .await?;
            parse_question_lines(&text)
        }
    };

    let session = InterviewSession::new(request.user_id, role, request.session_type, questions);
    let response = StartSessionResponse {
        session_id: session.id.clone(),
        questions: session.questions.clone(),
    };
    info!(
        "Started interview {} with {} questions for user {}",
        response.session_id,
        response.questions.len(),
        request.user_id
    );
    store.create_session(session).await?;

    Ok(response)
}

fn build_question_prompt(
    role: &str,
    difficulty: Difficulty,
    count: u32,
    resume_context: Option<&str>,
) -> String {
    match resume_context.filter(|r| !r.trim().is_empty()) {
        Some(resume) => {
            let capped: String = resume.chars().take(RESUME_CONTEXT_MAX_CHARS).collect();
            RESUME_QUESTION_PROMPT_TEMPLATE
                .replace("{role}", role)
                .replace("{resume}", &capped)
                .replace("{count}", &count.to_string())
                .replace("{difficulty}", difficulty.as_str())
        }
        None => QUESTION_PROMPT_TEMPLATE
            .replace("{count}", &count.to_string())
            .replace("{difficulty}", difficulty.as_str())
            .replace("{role}", role),
    }
}

/// Splits a free-text reply into question lines: trim each line, strip a
/// leading enumeration marker, drop short fragments.
fn parse_question_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(strip_enumeration_marker)
        .filter(|line| line.chars().count() > MIN_QUESTION_CHARS)
        .map(str::to_string)
        .collect()
}

/// Strips markers like "1. ", "2) ", "3- " from the start of a line.
/// Digits must be followed by at least one of `.`, `)`, `-` or whitespace;
/// a line that merely starts with digits ("5G networks...") is untouched.
fn strip_enumeration_marker(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }
    let stripped =
        rest.trim_start_matches(|c: char| c == '.' || c == ')' || c == '-' || c.is_whitespace());
    if stripped.len() == rest.len() {
        return line;
    }
    stripped
}

#[cfg(test)]
mod tests {
    use crate::llm_client::testing::ScriptedClient;
    use crate::store::memory::MemoryStore;
    use crate::store::SessionStore;

    use super::*;

    fn request(user_id: Uuid) -> StartSessionRequest {
        StartSessionRequest {
            user_id,
            role: Some("Backend Engineer".to_string()),
            difficulty: Difficulty::Beginner,
            question_count: Some(3),
            resume_context: None,
            preset_questions: None,
            session_type: SessionType::Standard,
        }
    }

    #[test]
    fn test_strip_enumeration_marker_variants() {
        assert_eq!(strip_enumeration_marker("1. What is REST?"), "What is REST?");
        assert_eq!(strip_enumeration_marker("2) Explain SQL joins."), "Explain SQL joins.");
        assert_eq!(strip_enumeration_marker("3- What is a mutex?"), "What is a mutex?");
        assert_eq!(strip_enumeration_marker("10 . Deep question"), "Deep question");
        // Digits not followed by a marker stay put.
        assert_eq!(strip_enumeration_marker("5G network basics"), "5G network basics");
        assert_eq!(strip_enumeration_marker("What is REST?"), "What is REST?");
    }

    #[test]
    fn test_parse_drops_short_fragments() {
        let text = "1. What is REST?\n\n2. ok\n3. Explain SQL joins.";
        let parsed = parse_question_lines(text);
        assert_eq!(parsed, vec!["What is REST?", "Explain SQL joins."]);
    }

    #[tokio::test]
    async fn test_start_session_parses_numbered_reply() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Ok(
            "1. What is REST?\n2. Explain SQL joins.\n3. What is a race condition?",
        ));
        let user_id = Uuid::new_v4();

        let resp = start_session(&store, &llm, request(user_id)).await.unwrap();
        assert_eq!(
            resp.questions,
            vec![
                "What is REST?",
                "Explain SQL joins.",
                "What is a race condition?"
            ]
        );
        assert_eq!(llm.calls(), 1);

        let stored = store
            .get_session(&resp.session_id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.questions.len(), 3);
        assert!(stored.answers.is_empty());
        assert!(stored.scores.is_empty());
        assert!(stored.feedback.is_empty());
        assert_eq!(stored.role, "Backend Engineer");
    }

    #[tokio::test]
    async fn test_preset_questions_skip_the_model() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Err("must not be called"));
        let mut req = request(Uuid::new_v4());
        req.preset_questions = Some(vec![
            "Walk me through your last project.".to_string(),
            "Why this company?".to_string(),
        ]);
        req.session_type = SessionType::ResumeBased;

        let resp = start_session(&store, &llm, req).await.unwrap();
        assert_eq!(resp.questions.len(), 2);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_preset_list_falls_through_to_generation() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Ok("1. What is ownership in Rust?"));
        let mut req = request(Uuid::new_v4());
        req.preset_questions = Some(vec![]);

        let resp = start_session(&store, &llm, req).await.unwrap();
        assert_eq!(resp.questions, vec!["What is ownership in Rust?"]);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_role_defaults() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Ok("1. Question one is long enough?"));
        let user_id = Uuid::new_v4();
        let mut req = request(user_id);
        req.role = Some("   ".to_string());

        let resp = start_session(&store, &llm, req).await.unwrap();
        let stored = store
            .get_session(&resp.session_id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.role, DEFAULT_ROLE);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_without_retry() {
        let store = MemoryStore::new();
        let llm = ScriptedClient::repeating(Err("connection refused"));
        let err = start_session(&store, &llm, request(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert_eq!(llm.calls(), 1, "no retry on transport failure");
    }

    #[tokio::test]
    async fn test_count_is_a_hint_not_a_guarantee() {
        let store = MemoryStore::new();
        // Model ignores the requested count of 3 and returns 2.
        let llm = ScriptedClient::repeating(Ok("1. First question here?\n2. Second question here?"));
        let resp = start_session(&store, &llm, request(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(resp.questions.len(), 2);
    }

    #[test]
    fn test_resume_context_is_capped() {
        let long_resume = "z".repeat(10_000);
        let prompt = build_question_prompt(
            "Backend Engineer",
            Difficulty::Intermediate,
            3,
            Some(&long_resume),
        );
        // Exactly the capped slice of the resume survives into the prompt.
        assert_eq!(prompt.matches('z').count(), RESUME_CONTEXT_MAX_CHARS);
        assert!(prompt.contains("Intermediate"));
    }
}

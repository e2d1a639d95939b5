use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Difficulty requested for generated interview questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Label embedded into prompts, e.g. "Beginner-level".
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

/// How the session's questions were sourced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionType {
    #[default]
    #[serde(rename = "standard")]
    Standard,
    #[serde(rename = "resume-based")]
    ResumeBased,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Standard => "standard",
            SessionType::ResumeBased => "resume-based",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "resume-based" => SessionType::ResumeBased,
            _ => SessionType::Standard,
        }
    }
}

/// One interview run: an ordered question list with parallel answer, score
/// and feedback histories.
///
/// Invariant: `answers.len() == scores.len() == feedback.len()
/// <= questions.len()`. The lists only ever grow, by exactly one element
/// per accepted answer, through the store's append path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub id: String,
    pub user_id: Uuid,
    pub role: String,
    pub session_type: SessionType,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub scores: Vec<u8>,
    pub feedback: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl InterviewSession {
    /// Creates a fresh session with empty histories.
    pub fn new(
        user_id: Uuid,
        role: String,
        session_type: SessionType,
        questions: Vec<String>,
    ) -> Self {
        Self {
            id: super::next_record_id(),
            user_id,
            role,
            session_type,
            questions,
            answers: Vec::new(),
            scores: Vec::new(),
            feedback: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// True while at least one question is still unanswered.
    pub fn has_open_questions(&self) -> bool {
        self.answers.len() < self.questions.len()
    }
}

//! Session store — the injected persistence interface.
//!
//! Components never hold a process-wide database handle; they receive a
//! `dyn SessionStore` and go through it for every read and write. The only
//! mutation of an existing record is `append_turn`, which implementations
//! must make atomic per session so concurrent answer submissions cannot
//! lose an update.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::review::ResumeReview;
use crate::models::session::InterviewSession;

/// One accepted answer submission: the three values appended in lockstep to
/// a session's parallel histories.
#[derive(Debug, Clone)]
pub struct AnswerTurn {
    pub answer: String,
    pub score: u8,
    pub feedback: String,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: InterviewSession) -> Result<(), AppError>;

    /// Fetches a session only if it is owned by `owner`.
    async fn get_session(
        &self,
        id: &str,
        owner: Uuid,
    ) -> Result<Option<InterviewSession>, AppError>;

    /// All sessions for one owner, newest first.
    async fn list_sessions(&self, owner: Uuid) -> Result<Vec<InterviewSession>, AppError>;

    /// Appends one turn to the session's parallel lists in a single atomic
    /// step. Fails with `NotFound` for unknown/unowned ids and with
    /// `InvalidInput` once every question already has an answer.
    async fn append_turn(&self, id: &str, owner: Uuid, turn: AnswerTurn) -> Result<(), AppError>;

    async fn create_review(&self, review: ResumeReview) -> Result<(), AppError>;

    async fn get_review(&self, id: &str, owner: Uuid) -> Result<Option<ResumeReview>, AppError>;

    /// All reviews for one owner, newest first.
    async fn list_reviews(&self, owner: Uuid) -> Result<Vec<ResumeReview>, AppError>;

    /// Deletes a review and returns its stored file ref so the caller can
    /// signal file deletion to the storage collaborator. `None` when no
    /// owned review matched.
    async fn delete_review(&self, id: &str, owner: Uuid) -> Result<Option<String>, AppError>;
}

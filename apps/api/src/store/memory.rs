//! In-memory `SessionStore`. Backs the orchestration unit tests and local
//! experimentation; the production store is `store::postgres`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::review::ResumeReview;
use crate::models::session::InterviewSession;
use crate::store::{AnswerTurn, SessionStore};

#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, InterviewSession>>,
    reviews: Mutex<HashMap<String, ResumeReview>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a whole session record. Test-only: this is the unguarded
    /// second half of a read-modify-write, kept around to demonstrate the
    /// lost-update hazard that `append_turn` closes.
    #[cfg(test)]
    pub async fn replace_session(&self, session: InterviewSession) {
        self.sessions.lock().await.insert(session.id.clone(), session);
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: InterviewSession) -> Result<(), AppError> {
        self.sessions
            .lock()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_session(
        &self,
        id: &str,
        owner: Uuid,
    ) -> Result<Option<InterviewSession>, AppError> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(id)
            .filter(|s| s.user_id == owner)
            .cloned())
    }

    async fn list_sessions(&self, owner: Uuid) -> Result<Vec<InterviewSession>, AppError> {
        let mut sessions: Vec<InterviewSession> = self
            .sessions
            .lock()
            .await
            .values()
            .filter(|s| s.user_id == owner)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn append_turn(&self, id: &str, owner: Uuid, turn: AnswerTurn) -> Result<(), AppError> {
        // Single lock hold around read and write: the per-session critical
        // section that makes the append atomic.
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(id)
            .filter(|s| s.user_id == owner)
            .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

        if !session.has_open_questions() {
            return Err(AppError::InvalidInput(
                "All questions in this interview already have answers".to_string(),
            ));
        }

        session.answers.push(turn.answer);
        session.scores.push(turn.score);
        session.feedback.push(turn.feedback);
        Ok(())
    }

    async fn create_review(&self, review: ResumeReview) -> Result<(), AppError> {
        self.reviews.lock().await.insert(review.id.clone(), review);
        Ok(())
    }

    async fn get_review(&self, id: &str, owner: Uuid) -> Result<Option<ResumeReview>, AppError> {
        Ok(self
            .reviews
            .lock()
            .await
            .get(id)
            .filter(|r| r.user_id == owner)
            .cloned())
    }

    async fn list_reviews(&self, owner: Uuid) -> Result<Vec<ResumeReview>, AppError> {
        let mut reviews: Vec<ResumeReview> = self
            .reviews
            .lock()
            .await
            .values()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn delete_review(&self, id: &str, owner: Uuid) -> Result<Option<String>, AppError> {
        let mut reviews = self.reviews.lock().await;
        match reviews.get(id) {
            Some(r) if r.user_id == owner => {
                let file_ref = r.file_ref.clone();
                reviews.remove(id);
                Ok(Some(file_ref))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::models::session::SessionType;

    use super::*;

    fn session_with_questions(owner: Uuid, n: usize) -> InterviewSession {
        let questions = (1..=n).map(|i| format!("Question {i}?")).collect();
        InterviewSession::new(owner, "Backend Engineer".to_string(), SessionType::Standard, questions)
    }

    fn turn(answer: &str) -> AnswerTurn {
        AnswerTurn {
            answer: answer.to_string(),
            score: 7,
            feedback: format!("Feedback for {answer}"),
        }
    }

    #[tokio::test]
    async fn test_get_session_requires_ownership() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let session = session_with_questions(owner, 2);
        let id = session.id.clone();
        store.create_session(session).await.unwrap();

        assert!(store.get_session(&id, owner).await.unwrap().is_some());
        assert!(store
            .get_session(&id, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_append_keeps_parallel_lists_aligned() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let session = session_with_questions(owner, 3);
        let id = session.id.clone();
        store.create_session(session).await.unwrap();

        for i in 0..3 {
            store.append_turn(&id, owner, turn(&format!("answer {i}"))).await.unwrap();
            let s = store.get_session(&id, owner).await.unwrap().unwrap();
            assert_eq!(s.answers.len(), i + 1);
            assert_eq!(s.scores.len(), i + 1);
            assert_eq!(s.feedback.len(), i + 1);
            assert!(s.answers.len() <= s.questions.len());
        }
    }

    #[tokio::test]
    async fn test_append_refuses_once_all_questions_answered() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let session = session_with_questions(owner, 1);
        let id = session.id.clone();
        store.create_session(session).await.unwrap();

        store.append_turn(&id, owner, turn("only answer")).await.unwrap();
        let err = store.append_turn(&id, owner, turn("extra")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_append_unknown_or_unowned_is_not_found() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let session = session_with_questions(owner, 1);
        let id = session.id.clone();
        store.create_session(session).await.unwrap();

        let err = store.append_turn("missing", owner, turn("a")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = store
            .append_turn(&id, Uuid::new_v4(), turn("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    /// A naive read-modify-write (get whole record, mutate the clone, write
    /// it back) loses one of two interleaved submissions: both read the same
    /// state, the second write clobbers the first. This is the hazard the
    /// store's append path exists to close.
    #[tokio::test]
    async fn test_naive_read_modify_write_loses_an_update() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let session = session_with_questions(owner, 2);
        let id = session.id.clone();
        store.create_session(session).await.unwrap();

        // Both "callers" read before either writes.
        let mut seen_by_a = store.get_session(&id, owner).await.unwrap().unwrap();
        let mut seen_by_b = store.get_session(&id, owner).await.unwrap().unwrap();

        seen_by_a.answers.push("answer from A".to_string());
        seen_by_a.scores.push(8);
        seen_by_a.feedback.push("fb A".to_string());
        store.replace_session(seen_by_a).await;

        seen_by_b.answers.push("answer from B".to_string());
        seen_by_b.scores.push(6);
        seen_by_b.feedback.push("fb B".to_string());
        store.replace_session(seen_by_b).await;

        let final_state = store.get_session(&id, owner).await.unwrap().unwrap();
        assert_eq!(final_state.answers.len(), 1, "one submission was lost");
        assert_eq!(final_state.answers[0], "answer from B");
    }

    /// The same two submissions through `append_turn`, issued concurrently,
    /// both survive: the append is serialized per session.
    #[tokio::test]
    async fn test_concurrent_atomic_appends_both_survive() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        let session = session_with_questions(owner, 2);
        let id = session.id.clone();
        store.create_session(session).await.unwrap();

        let (store_a, id_a) = (Arc::clone(&store), id.clone());
        let (store_b, id_b) = (Arc::clone(&store), id.clone());
        let a = tokio::spawn(async move { store_a.append_turn(&id_a, owner, turn("from A")).await });
        let b = tokio::spawn(async move { store_b.append_turn(&id_b, owner, turn("from B")).await });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let final_state = store.get_session(&id, owner).await.unwrap().unwrap();
        assert_eq!(final_state.answers.len(), 2);
        assert_eq!(final_state.scores.len(), 2);
        assert_eq!(final_state.feedback.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_review_returns_file_ref_once() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let assessment = crate::models::review::ResumeAssessment {
            ats_score: 70,
            keywords_matched: vec![],
            missing_skills: vec![],
            formatting_issues: vec![],
        };
        let review = ResumeReview::from_assessment(
            owner,
            "SRE".to_string(),
            &assessment,
            "stored-file.pdf".to_string(),
        );
        let id = review.id.clone();
        store.create_review(review).await.unwrap();

        // Wrong owner cannot delete.
        assert!(store
            .delete_review(&id, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());

        let file_ref = store.delete_review(&id, owner).await.unwrap();
        assert_eq!(file_ref.as_deref(), Some("stored-file.pdf"));
        assert!(store.get_review(&id, owner).await.unwrap().is_none());
        assert!(store.delete_review(&id, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_sessions_filters_by_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store
            .create_session(session_with_questions(owner, 1))
            .await
            .unwrap();
        store
            .create_session(session_with_questions(Uuid::new_v4(), 1))
            .await
            .unwrap();

        assert_eq!(store.list_sessions(owner).await.unwrap().len(), 1);
    }
}

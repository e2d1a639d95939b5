//! PostgreSQL `SessionStore`. The parallel interview lists live in JSONB
//! columns; `append_turn` appends to all three in one conditional UPDATE,
//! which is atomic per row and therefore per session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::review::ResumeReview;
use crate::models::session::{InterviewSession, SessionType};
use crate::store::{AnswerTurn, SessionStore};

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct InterviewRow {
    id: String,
    user_id: Uuid,
    role: String,
    session_type: String,
    questions: Json<Vec<String>>,
    answers: Json<Vec<String>>,
    scores: Json<Vec<u8>>,
    feedback: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl From<InterviewRow> for InterviewSession {
    fn from(row: InterviewRow) -> Self {
        InterviewSession {
            id: row.id,
            user_id: row.user_id,
            role: row.role,
            session_type: SessionType::from_str(&row.session_type),
            questions: row.questions.0,
            answers: row.answers.0,
            scores: row.scores.0,
            feedback: row.feedback.0,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ReviewRow {
    id: String,
    user_id: Uuid,
    target_role: String,
    ats_score: i32,
    keywords_matched: Json<Vec<String>>,
    missing_skills: Json<Vec<String>>,
    formatting_issues: Json<Vec<String>>,
    file_ref: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for ResumeReview {
    fn from(row: ReviewRow) -> Self {
        ResumeReview {
            id: row.id,
            user_id: row.user_id,
            target_role: row.target_role,
            ats_score: row.ats_score,
            keywords_matched: row.keywords_matched.0,
            missing_skills: row.missing_skills.0,
            formatting_issues: row.formatting_issues.0,
            file_ref: row.file_ref,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create_session(&self, session: InterviewSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO interviews
                (id, user_id, role, session_type, questions, answers, scores, feedback, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(&session.role)
        .bind(session.session_type.as_str())
        .bind(Json(&session.questions))
        .bind(Json(&session.answers))
        .bind(Json(&session.scores))
        .bind(Json(&session.feedback))
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(
        &self,
        id: &str,
        owner: Uuid,
    ) -> Result<Option<InterviewSession>, AppError> {
        let row: Option<InterviewRow> =
            sqlx::query_as("SELECT * FROM interviews WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(InterviewSession::from))
    }

    async fn list_sessions(&self, owner: Uuid) -> Result<Vec<InterviewSession>, AppError> {
        let rows: Vec<InterviewRow> =
            sqlx::query_as("SELECT * FROM interviews WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(owner)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(InterviewSession::from).collect())
    }

    async fn append_turn(&self, id: &str, owner: Uuid, turn: AnswerTurn) -> Result<(), AppError> {
        // One statement appends to all three lists; the row-level guard keeps
        // the histories from outgrowing the question list even under
        // concurrent submissions.
        let result = sqlx::query(
            r#"
            UPDATE interviews
            SET answers  = answers  || $3,
                scores   = scores   || $4,
                feedback = feedback || $5
            WHERE id = $1 AND user_id = $2
              AND jsonb_array_length(answers) < jsonb_array_length(questions)
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(Json(vec![turn.answer]))
        .bind(Json(vec![turn.score]))
        .bind(Json(vec![turn.feedback]))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing matched: either the session isn't this caller's, or every
        // question already has an answer.
        let exists: Option<(String,)> =
            sqlx::query_as("SELECT id FROM interviews WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        match exists {
            Some(_) => Err(AppError::InvalidInput(
                "All questions in this interview already have answers".to_string(),
            )),
            None => Err(AppError::NotFound(format!("Interview {id} not found"))),
        }
    }

    async fn create_review(&self, review: ResumeReview) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO resume_reviews
                (id, user_id, target_role, ats_score, keywords_matched,
                 missing_skills, formatting_issues, file_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&review.id)
        .bind(review.user_id)
        .bind(&review.target_role)
        .bind(review.ats_score)
        .bind(Json(&review.keywords_matched))
        .bind(Json(&review.missing_skills))
        .bind(Json(&review.formatting_issues))
        .bind(&review.file_ref)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_review(&self, id: &str, owner: Uuid) -> Result<Option<ResumeReview>, AppError> {
        let row: Option<ReviewRow> =
            sqlx::query_as("SELECT * FROM resume_reviews WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(ResumeReview::from))
    }

    async fn list_reviews(&self, owner: Uuid) -> Result<Vec<ResumeReview>, AppError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            "SELECT * FROM resume_reviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ResumeReview::from).collect())
    }

    async fn delete_review(&self, id: &str, owner: Uuid) -> Result<Option<String>, AppError> {
        let row: Option<(String,)> = sqlx::query_as(
            "DELETE FROM resume_reviews WHERE id = $1 AND user_id = $2 RETURNING file_ref",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(file_ref,)| file_ref))
    }
}

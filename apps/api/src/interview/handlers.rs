use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::evaluation::{submit_answer, summarize_session, AnswerEvaluation, SessionSummary};
use crate::interview::ideal::{synthesize_ideal_answers, IdealAnswer};
use crate::interview::questions::{start_session, StartSessionRequest, StartSessionResponse};
use crate::models::session::InterviewSession;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// POST /api/v1/interviews
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, AppError> {
    let response = start_session(state.store.as_ref(), state.llm.as_ref(), req).await?;
    Ok(Json(response))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<InterviewSession>>, AppError> {
    let sessions = state.store.list_sessions(params.user_id).await?;
    Ok(Json(sessions))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = state
        .store
        .get_session(&id, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    Ok(Json(session))
}

#[derive(Deserialize)]
pub struct SubmitAnswerRequest {
    pub user_id: Uuid,
    pub question: String,
    pub answer: String,
}

/// POST /api/v1/interviews/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<AnswerEvaluation>, AppError> {
    let evaluation = submit_answer(
        state.store.as_ref(),
        state.llm.as_ref(),
        req.user_id,
        &id,
        &req.question,
        &req.answer,
    )
    .await?;
    Ok(Json(evaluation))
}

/// GET /api/v1/interviews/:id/summary
pub async fn handle_interview_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SessionSummary>, AppError> {
    let summary = summarize_session(state.store.as_ref(), params.user_id, &id).await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
pub struct IdealAnswersRequest {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct IdealAnswersResponse {
    pub ideal_answers: Vec<IdealAnswer>,
}

/// POST /api/v1/interviews/:id/ideal-answers
pub async fn handle_ideal_answers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<IdealAnswersRequest>,
) -> Result<Json<IdealAnswersResponse>, AppError> {
    let ideal_answers =
        synthesize_ideal_answers(state.store.as_ref(), state.llm.as_ref(), req.user_id, &id)
            .await?;
    Ok(Json(IdealAnswersResponse { ideal_answers }))
}

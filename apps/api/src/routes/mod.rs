pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview sessions
        .route(
            "/api/v1/interviews",
            post(interview::handle_start_interview).get(interview::handle_list_interviews),
        )
        .route("/api/v1/interviews/:id", get(interview::handle_get_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/summary",
            get(interview::handle_interview_summary),
        )
        .route(
            "/api/v1/interviews/:id/ideal-answers",
            post(interview::handle_ideal_answers),
        )
        // Resume reviews
        .route("/api/v1/resumes/analyze", post(resume::handle_analyze_resume))
        .route(
            "/api/v1/resumes/reviews",
            get(resume::handle_list_reviews),
        )
        .route(
            "/api/v1/resumes/reviews/:id",
            get(resume::handle_get_review).delete(resume::handle_delete_review),
        )
        .with_state(state)
}

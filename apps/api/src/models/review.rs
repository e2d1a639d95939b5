use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Structured ATS-style assessment the model must produce for a resume.
/// Field names are camelCase because that is the exact JSON schema the
/// analysis prompt demands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAssessment {
    pub ats_score: i32,
    pub keywords_matched: Vec<String>,
    pub missing_skills: Vec<String>,
    pub formatting_issues: Vec<String>,
}

impl ResumeAssessment {
    /// An assessment is only accepted when its score is a valid
    /// ATS percentage.
    pub fn score_in_range(&self) -> bool {
        (0..=100).contains(&self.ats_score)
    }
}

/// Persisted record of one resume analysis. Written once per successful
/// analysis, never mutated; deleted only as a whole together with its file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeReview {
    pub id: String,
    pub user_id: Uuid,
    pub target_role: String,
    pub ats_score: i32,
    pub keywords_matched: Vec<String>,
    pub missing_skills: Vec<String>,
    pub formatting_issues: Vec<String>,
    /// Opaque handle to the uploaded artifact, owned by the file-storage
    /// collaborator.
    pub file_ref: String,
    pub created_at: DateTime<Utc>,
}

impl ResumeReview {
    pub fn from_assessment(
        user_id: Uuid,
        target_role: String,
        assessment: &ResumeAssessment,
        file_ref: String,
    ) -> Self {
        Self {
            id: super::next_record_id(),
            user_id,
            target_role,
            ats_score: assessment.ats_score,
            keywords_matched: assessment.keywords_matched.clone(),
            missing_skills: assessment.missing_skills.clone(),
            formatting_issues: assessment.formatting_issues.clone(),
            file_ref,
            created_at: Utc::now(),
        }
    }
}

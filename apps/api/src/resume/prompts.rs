// Model prompt constants for resume analysis.

use crate::llm_client::CompletionParams;

pub const ANALYSIS_SYSTEM: &str =
    "You are an expert ATS (Applicant Tracking System) and Resume Coach.";

/// Low temperature: the analyzer wants a stable JSON object, not prose.
pub const ANALYSIS_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 1024,
    temperature: 0.2,
};

/// Structured-assessment prompt. The analyzer extracts and parses the first
/// `{...}`-delimited substring of the reply.
/// Replace: {target_role}, {resume}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze this resume for the role: "{target_role}".
Resume Text: {resume}

Provide analysis including:
- ATS compatibility score
- Matched keywords and skills
- Missing critical skills for the role
- Formatting issues (structure, readability, ATS problems)
- Grammatical and writing errors (be accurate - only report actual errors, not stylistic preferences)

Return JSON:
{
  "atsScore": <0-100>,
  "keywordsMatched": [relevant skills/keywords found],
  "missingSkills": [critical skills missing for this role],
  "formattingIssues": [formatting, structure, ATS issues, and ACTUAL grammatical errors only]
}"#;

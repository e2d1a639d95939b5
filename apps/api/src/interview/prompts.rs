// All model prompt constants for the interview module.

use crate::llm_client::CompletionParams;

/// Resume context embedded into a question prompt is capped to keep the
/// request inside the model's context budget.
pub const RESUME_CONTEXT_MAX_CHARS: usize = 4000;

pub const QUESTION_SYSTEM: &str = "You are a professional interviewer.";

pub const QUESTION_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 512,
    temperature: 0.7,
};

/// Question generation prompt.
/// Replace: {count}, {difficulty}, {role}
pub const QUESTION_PROMPT_TEMPLATE: &str = "Ask exactly {count} short and to the point \
    {difficulty}-level interview questions for a {role}. Return only numbered questions.";

/// Resume-based question generation prompt.
/// Replace: {role}, {resume}, {count}, {difficulty}
pub const RESUME_QUESTION_PROMPT_TEMPLATE: &str = r#"You are an expert technical interviewer.
ROLE: {role}
RESUME: """{resume}"""
INSTRUCTIONS: Ask exactly {count} {difficulty}-level questions.
Return ONLY the numbered questions."#;

pub const SCORING_SYSTEM: &str = "You are an interview coach.";

pub const SCORING_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 256,
    temperature: 0.7,
};

/// Answer scoring prompt. The evaluator pattern-matches the
/// "Score (out of 10):" line of the reply.
/// Replace: {question}, {answer}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Question: {question}
Answer: {answer}
Evaluate briefly:
Score (out of 10): <number>
Feedback: <sentence>"#;

pub const IDEAL_SYSTEM: &str = "You are a senior interview coach.";

pub const IDEAL_PARAMS: CompletionParams = CompletionParams {
    max_tokens: 1500,
    temperature: 0.7,
};

/// Batched ideal-answer prompt. Demands a raw JSON array matching the
/// question count; the synthesizer validates both shape and length.
/// Replace: {questions} (numbered, one per line)
pub const IDEAL_PROMPT_TEMPLATE: &str = r#"Questions:
{questions}

INSTRUCTIONS:
1. Generate a concise, ideal (10/10) answer for each question above.
2. Return ONLY a valid JSON array of strings, where each string is the ideal answer to the corresponding question.
3. Do NOT wrap the JSON in markdown formatting (like ```json). Return the raw JSON array.
4. Do NOT include any intro or outro text."#;

/// Substituted for any ideal answer the model failed to provide.
pub const IDEAL_ANSWER_PLACEHOLDER: &str = "Detailed AI answer unavailable. \
    Please focus on relevant skills and use the STAR method.";

//! Generative client — the single point of entry for all model calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the inference API
//! directly. Every model interaction goes through `GenerativeClient`.
//!
//! One invocation of `complete` issues exactly one upstream request. There
//! is deliberately no transport-level retry here: the validation loops in
//! `interview::ideal` and `resume::analyzer` own all retrying, and they are
//! capped at three client invocations per operation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const HF_ROUTER_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// The model used for all completions.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "Qwen/Qwen2.5-72B-Instruct";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned empty content")]
    EmptyContent,
}

/// Per-call sampling parameters. Each prompt site picks its own budget.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Boundary abstraction over the external text-generation dependency:
/// one call in, one text completion out, or a transport failure.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Production client for the Hugging Face inference router
/// (OpenAI-compatible chat completions).
#[derive(Clone)]
pub struct HfChatClient {
    client: Client,
    api_key: String,
}

impl HfChatClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl GenerativeClient for HfChatClient {
    async fn complete(
        &self,
        system: &str,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(HF_ROUTER_URL)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyContent)?;

        debug!("model call succeeded: {} chars", content.len());
        Ok(content)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[\"a\", \"b\"]\n```";
        assert_eq!(strip_json_fences(input), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n[\"a\", \"b\"]\n```";
        assert_eq!(strip_json_fences(input), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "[\"a\", \"b\"]";
        assert_eq!(strip_json_fences(input), "[\"a\", \"b\"]");
    }

    #[tokio::test]
    async fn test_scripted_client_replays_and_repeats() {
        use super::testing::ScriptedClient;

        let params = CompletionParams {
            max_tokens: 16,
            temperature: 0.0,
        };
        let client = ScriptedClient::sequence(vec![Ok("first"), Err("down")]);

        assert_eq!(client.complete("s", "p", params).await.unwrap(), "first");
        assert!(client.complete("s", "p", params).await.is_err());
        // Script exhausted: the last reply repeats.
        assert!(client.complete("s", "p", params).await.is_err());
        assert_eq!(client.calls(), 3);
    }
}

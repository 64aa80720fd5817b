//! Minimal chat-completions client for the Mistral API.

use crate::acquisition::http_client::HttpClient;
use crate::error::{SourceError, SourceResult};
use serde::{Deserialize, Serialize};

/// Public Mistral API.
pub const MISTRAL_API_URL: &str = "https://api.mistral.ai";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 800;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends prompts that must be answered with a JSON object.
#[derive(Clone)]
pub struct ChatClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(http: HttpClient, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            base_url: MISTRAL_API_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Point at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one completion and return the message content.
    pub async fn complete_json(&self, system: &str, user: &str) -> SourceResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .http
            .post_json(&url, Some(&self.api_key), &serde_json::to_value(&request)?)
            .await?;

        if !response.is_success() {
            return Err(SourceError::Api(format!(
                "HTTP {}: {}",
                response.status,
                api_error_message(&response.body)
            )));
        }

        let body: ChatResponse = serde_json::from_str(&response.body)?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| SourceError::Api("no choices in response".to_string()))
    }
}

/// Best human-readable message from an error body.
fn api_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    ["/message", "/error/message", "/detail"]
        .iter()
        .find_map(|p| value.pointer(p).and_then(|v| v.as_str()))
        .map(String::from)
        .unwrap_or_else(|| body.trim().to_string())
}

/// The JSON object in a model answer, without code fences or chatter around it.
pub fn extract_json_object(content: &str) -> &str {
    let trimmed = content.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

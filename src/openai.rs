//! OpenAI chat-completions backend for [`VisionProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderFailure;
use crate::provider::{CaptionRequest, VisionProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            api_key: api_key.into(),
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn build_body(request: &CaptionRequest) -> ChatRequestBody<'_> {
    ChatRequestBody {
        model: &request.model,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: &request.prompt,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: request.image.as_str(),
                    },
                },
            ],
        }],
        max_tokens: request.max_tokens,
    }
}

/// Pulls `error.message` out of an OpenAI error body, falling back to the raw text.
fn error_message(body: &str) -> Option<String> {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return Some(parsed.error.message);
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn preview(body: &str) -> String {
    body.chars().take(500).collect()
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    async fn describe(&self, request: &CaptionRequest) -> Result<Option<String>, ProviderFailure> {
        tracing::debug!(
            model = %request.model,
            media_type = %request.image.media_type(),
            "sending caption request to OpenAI"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&build_body(request))
            .send()
            .await
            .map_err(|e| ProviderFailure::Transport(e.into()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderFailure::Transport(e.into()))?;

        tracing::debug!(%status, body = %preview(&text), "OpenAI response");

        if !status.is_success() {
            let message = error_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            return Err(ProviderFailure::Api {
                status: Some(status.as_u16()),
                message,
            });
        }

        let parsed: ChatResponseBody =
            serde_json::from_str(&text).map_err(|e| ProviderFailure::Api {
                status: None,
                message: format!("Unexpected response from OpenAI: {e}"),
            })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }
}

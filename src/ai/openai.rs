//! OpenAI-compatible chat completions client.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AiClient, AiError};

/// Default API endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize, Debug)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
    model: Option<String>,
}

/// OpenAI-compatible API client.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl OpenAiClient {
    /// Creates a client against the public OpenAI endpoint.
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_base_url(model, api_key, OPENAI_BASE_URL)
    }

    /// Creates a client against a custom OpenAI-compatible endpoint.
    pub fn with_base_url(
        model: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            max_tokens: Some(512),
            temperature: Some(0.1),
        }
    }

    fn api_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/v1/chat/completions")
    }
}

impl AiClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiError>> + Send + 'a>> {
        Box::pin(async move {
            let mut messages = Vec::with_capacity(2);
            if !system_prompt.is_empty() {
                messages.push(Message {
                    role: "system",
                    content: system_prompt.to_string(),
                });
            }
            messages.push(Message {
                role: "user",
                content: user_prompt.to_string(),
            });

            let request = ChatRequest {
                model: self.model.clone(),
                messages,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                stream: false,
            };

            let url = self.api_url();
            info!(url = %url, model = %self.model, "Sending request to OpenAI-compatible API");

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .map_err(AiError::Network)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AiError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

            debug!(
                choice_count = parsed.choices.len(),
                model = ?parsed.model,
                "Received OpenAI-compatible API response"
            );

            parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .ok_or_else(|| AiError::InvalidResponse("no choices in response".to_string()))
        })
    }
}

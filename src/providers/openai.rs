use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{check_status, join_url, map_send_error, CodeModel};
use crate::errors::ProviderError;

/// Client for OpenAI-style chat completion servers (OpenAI, LM Studio)
#[derive(Debug)]
pub struct OpenAI {
    client: Client,
    /// API root including the version segment, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Bearer token; local servers accept an empty one
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl OpenAIRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl OpenAIResponse {
    // @returns: Content of the first choice, empty when there is none
    pub fn text(&self) -> String {
        self.choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}

impl OpenAI {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            temperature,
            max_tokens,
        }
    }

    /// Complete a chat request
    pub async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let url = join_url(&self.endpoint, "chat/completions");

        let mut builder = self.client.post(&url).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await.map_err(|e| map_send_error("OpenAI", e))?;
        let response = check_status("OpenAI", response).await?;

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))
    }
}

#[async_trait]
impl CodeModel for OpenAI {
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = OpenAIRequest::new(model)
            .add_message("system", system)
            .add_message("user", prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        let response = self.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI model {} used {} prompt / {} completion tokens",
                model, usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(response.text())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

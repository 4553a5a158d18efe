use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{check_status, join_url, map_send_error, CodeModel};
use crate::errors::ProviderError;

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    temperature: f32,
    max_tokens: u32,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    pub model: String,
    /// Prompt to generate from
    pub prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerationOptions>,
    /// Whether to stream the response
    pub stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: false,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client
    ///
    /// `endpoint` is the server root, e.g. `http://localhost:11434`.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64, temperature: f32, max_tokens: u32) -> Self {
        Self {
            base_url: endpoint.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
            temperature,
            max_tokens,
        }
    }

    /// Send a generation request
    pub async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = join_url(&self.base_url, "api/generate");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error("Ollama", e))?;

        let response = check_status("Ollama", response).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Self::parse_response(&text)
    }

    /// Parse a generation response
    ///
    /// A server that ignores `stream: false` answers with JSON lines; their
    /// `response` fragments are concatenated.
    pub fn parse_response(text: &str) -> Result<GenerationResponse, ProviderError> {
        if let Ok(parsed) = serde_json::from_str::<GenerationResponse>(text) {
            return Ok(parsed);
        }

        let mut combined: Option<GenerationResponse> = None;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let chunk: GenerationResponse = serde_json::from_str(line).map_err(|e| {
                ProviderError::ParseError(format!("Failed to parse Ollama API response: {}", e))
            })?;
            match combined.as_mut() {
                Some(acc) => {
                    acc.response.push_str(&chunk.response);
                    acc.done = chunk.done;
                    acc.eval_count = chunk.eval_count.or(acc.eval_count);
                }
                None => combined = Some(chunk),
            }
        }

        combined.ok_or_else(|| ProviderError::ParseError("Empty Ollama API response".to_string()))
    }
}

#[async_trait]
impl CodeModel for Ollama {
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(model, prompt)
            .system(system)
            .temperature(self.temperature)
            .num_predict(self.max_tokens);

        let response = self.complete(request).await?;
        debug!(
            "Ollama model {} generated {} chars ({:?} tokens)",
            response.model,
            response.response.len(),
            response.eval_count
        );
        Ok(response.response)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

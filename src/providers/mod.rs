/*!
 * Clients for the language models used by AI conversion.
 *
 * This module contains client implementations for the supported backends:
 * - Ollama: local model server (`/api/generate`)
 * - OpenAI: chat completions, also used for LM Studio's compatible server
 * - Anthropic: messages API
 * - Mock: scripted model for tests
 */

use async_trait::async_trait;
use log::error;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{AiCommonConfig, AiProvider, ProviderConfig};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

/// Common trait for all code generation backends
///
/// Implementations are used interchangeably by the AI converter, which picks
/// the model name per request.
#[async_trait]
pub trait CodeModel: Send + Sync + Debug {
    /// Generate a completion
    ///
    /// # Arguments
    /// * `model` - Model name understood by the backend
    /// * `system` - System prompt
    /// * `prompt` - User prompt carrying the source code
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - Raw text produced by the model
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<String, ProviderError>;

    /// Backend name used in logs
    fn name(&self) -> &'static str;
}

/// Build the client for the active provider
pub fn build_model(
    provider: AiProvider,
    config: &ProviderConfig,
    common: &AiCommonConfig,
) -> Arc<dyn CodeModel> {
    match provider {
        AiProvider::Ollama => Arc::new(ollama::Ollama::new(
            &config.endpoint,
            config.timeout_secs,
            common.temperature,
            config.max_tokens,
        )),
        AiProvider::OpenAI | AiProvider::LMStudio => Arc::new(openai::OpenAI::new(
            &config.endpoint,
            &config.api_key,
            config.timeout_secs,
            common.temperature,
            config.max_tokens,
        )),
        AiProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            &config.endpoint,
            &config.api_key,
            config.timeout_secs,
            common.temperature,
            config.max_tokens,
        )),
    }
}

/// Map a transport failure onto the provider error taxonomy
pub(crate) fn map_send_error(backend: &str, err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", backend, err))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", backend, err))
    }
}

/// Turn a non-success HTTP status into an error, keeping the response body
pub(crate) async fn check_status(
    backend: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    error!("{} API error ({}): {}", backend, status, message);

    Err(match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    })
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/*!
 * AI-assisted conversion of single source files.
 *
 * `AiConverter` renders the prompt for a conversion type, asks the routed
 * model and then each fallback, and cleans the answer up. A model that errors
 * or answers with no code counts as failed; when every candidate failed the
 * caller converts the file with the rule engine instead.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{AiCommonConfig, AiConfig};
use crate::conversion::prompts::{render_system_prompt, PromptTemplate};
use crate::conversion::ConversionType;
use crate::errors::{ConversionError, ProviderError};
use crate::providers::{self, CodeModel};

pub mod response;
pub mod selection;

pub use response::extract_code;
pub use selection::{ModelChoice, ModelSelector};

/// Code produced by a model
#[derive(Debug, Clone, PartialEq)]
pub struct AiConversion {
    pub code: String,
    // @field: Model that produced `code`
    pub model: String,
}

/// Converts source files with a language model
#[derive(Debug, Clone)]
pub struct AiConverter {
    backend: Arc<dyn CodeModel>,
    selector: ModelSelector,
    system_prompt: String,
    retry_count: u32,
    retry_backoff_ms: u64,
}

impl AiConverter {
    pub fn new(backend: Arc<dyn CodeModel>, selector: ModelSelector, common: &AiCommonConfig) -> Self {
        Self {
            backend,
            selector,
            system_prompt: common.system_prompt.clone(),
            retry_count: common.retry_count,
            retry_backoff_ms: common.retry_backoff_ms,
        }
    }

    /// Build the converter for the configured provider
    ///
    /// # Returns
    /// * `Option<AiConverter>` - None when AI conversion is disabled
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let provider = config.active_provider();
        let backend = providers::build_model(config.provider, &provider, &config.common);
        let selector = ModelSelector::new(provider.model.clone(), config.model_routes.clone());
        info!(
            "AI conversion enabled: {} ({}), default model {}",
            config.provider.display_name(),
            provider.endpoint,
            provider.model
        );

        Some(Self::new(backend, selector, &config.common))
    }

    /// Use `model` for every file, ignoring the routing table
    pub fn with_model_override(mut self, model: impl Into<String>) -> Self {
        self.selector = ModelSelector::single(model);
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    /// Convert one source file
    pub async fn convert(
        &self,
        source: &str,
        conversion_type: ConversionType,
    ) -> Result<AiConversion, ConversionError> {
        let choice = self.selector.select_for_source(conversion_type, source);
        let system = render_system_prompt(&self.system_prompt, conversion_type);
        let prompt = PromptTemplate::for_conversion(conversion_type).render(source);

        let mut last_error = ProviderError::RequestFailed("No model configured".to_string());

        for model in choice.candidates() {
            debug!(
                "Requesting {} conversion from {} model {} ({} complexity)",
                conversion_type,
                self.backend.name(),
                model,
                choice.complexity
            );

            match self.generate_with_retries(model, &system, &prompt).await {
                Ok(raw) => {
                    let code = extract_code(&raw);
                    if code.is_empty() {
                        warn!("Model {} returned no code", model);
                        last_error = ProviderError::EmptyResponse(model.to_string());
                        continue;
                    }
                    return Ok(AiConversion {
                        code,
                        model: model.to_string(),
                    });
                }
                Err(err) => {
                    warn!("Model {} failed: {}", model, err);
                    last_error = err;
                }
            }
        }

        Err(ConversionError::Ai(last_error))
    }

    async fn generate_with_retries(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.backend.generate(model, system, prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if attempt < self.retry_count => {
                    let delay = self.retry_backoff_ms.saturating_mul(1 << attempt.min(16));
                    debug!(
                        "Retrying model {} in {} ms (attempt {}/{}): {}",
                        model,
                        delay,
                        attempt + 1,
                        self.retry_count,
                        err
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::ModelRoute;
    use crate::providers::mock::MockModel;

    fn common() -> AiCommonConfig {
        AiCommonConfig {
            retry_count: 0,
            retry_backoff_ms: 0,
            ..AiCommonConfig::default()
        }
    }

    fn routed() -> ModelSelector {
        ModelSelector::new(
            "base",
            vec![ModelRoute {
                conversion_types: vec![],
                complexities: vec![],
                model: "primary".to_string(),
                fallbacks: vec!["secondary".to_string()],
            }],
        )
    }

    #[tokio::test]
    async fn test_convert_withWorkingModel_shouldUsePrimary() {
        let mock = MockModel::working();
        let converter = AiConverter::new(Arc::new(mock.clone()), routed(), &common());

        let result = converter.convert("int x;", ConversionType::CToPython).await.unwrap();

        assert_eq!(result.model, "primary");
        assert_eq!(result.code, "# generated by primary\nresult = 42\n");
        let calls = mock.calls();
        let call = &calls[0];
        assert!(call.prompt.contains("int x;"));
        assert!(call.system.contains("C"));
        assert!(call.system.contains("Python"));
    }

    #[tokio::test]
    async fn test_convert_withFailingPrimary_shouldFallBack() {
        let mock = MockModel::working().with_failing_model("primary");
        let converter = AiConverter::new(Arc::new(mock.clone()), routed(), &common());

        let result = converter.convert("x = 1", ConversionType::PythonToJava).await.unwrap();

        assert_eq!(result.model, "secondary");
        assert_eq!(mock.requested_models(), vec!["primary", "secondary"]);
    }

    #[tokio::test]
    async fn test_convert_withEmptyAnswers_shouldFail() {
        let mock = MockModel::empty();
        let converter = AiConverter::new(Arc::new(mock.clone()), routed(), &common());

        let err = converter.convert("x = 1", ConversionType::PythonToJavascript).await.unwrap_err();

        assert!(matches!(err, ConversionError::Ai(ProviderError::EmptyResponse(ref m)) if m == "secondary"));
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_convert_withFencedAnswer_shouldStripFence() {
        let converter = AiConverter::new(Arc::new(MockModel::fenced()), ModelSelector::single("m"), &common());
        let result = converter.convert("x", ConversionType::JavaToPython).await.unwrap();
        assert_eq!(result.code, "# generated by m\nresult = 42\n");
    }

    #[tokio::test]
    async fn test_convert_withRetries_shouldRetrySameModel() {
        let mock = MockModel::intermittent(2);
        let settings = AiCommonConfig {
            retry_count: 1,
            retry_backoff_ms: 1,
            ..AiCommonConfig::default()
        };
        let converter = AiConverter::new(Arc::new(mock.clone()), ModelSelector::single("m"), &settings);

        // First call succeeds, second fails and is retried
        converter.convert("a", ConversionType::CToPython).await.unwrap();
        converter.convert("b", ConversionType::CToPython).await.unwrap();

        assert_eq!(mock.requested_models(), vec!["m", "m", "m"]);
    }

    #[test]
    fn test_fromConfig_whenDisabled_shouldBeNone() {
        let config = AiConfig {
            enabled: false,
            ..AiConfig::default()
        };
        assert!(AiConverter::from_config(&config).is_none());
    }

    #[test]
    fn test_withModelOverride_shouldReplaceRoutes() {
        let converter = AiConverter::new(Arc::new(MockModel::working()), routed(), &common())
            .with_model_override("forced");
        let choice = converter.selector().select(ConversionType::CToPython, crate::conversion::Complexity::High);
        assert_eq!(choice.candidates(), vec!["forced"]);
    }
}

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::conversion::{Complexity, ConversionType};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Where uploads, converted projects and the database live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upload limits
    #[serde(default)]
    pub upload: UploadConfig,

    /// AI conversion settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Account and login cookie settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP listener configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    // @returns: `host:port` bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Scratch directory for uploaded archives, one sub directory per session
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Converted projects and their archives
    #[serde(default = "default_converted_dir")]
    pub converted_dir: PathBuf,

    /// SQLite database file; empty means the per-user data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            converted_dir: default_converted_dir(),
            database_path: None,
        }
    }
}

/// Upload limits
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UploadConfig {
    /// Largest accepted archive in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Accepted archive extensions, without the dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Largest accepted unpacked project in bytes
    #[serde(default = "default_max_extracted_bytes")]
    pub max_extracted_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            allowed_extensions: default_allowed_extensions(),
            max_extracted_bytes: default_max_extracted_bytes(),
        }
    }
}

/// AI provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl AiProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Hosted providers refuse requests without a key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Default model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: AiProvider) -> Self {
        let (model, endpoint, timeout_secs) = match provider_type {
            AiProvider::Ollama => (
                default_ollama_model(),
                default_ollama_endpoint(),
                default_timeout_secs(),
            ),
            AiProvider::OpenAI => (
                default_openai_model(),
                default_openai_endpoint(),
                default_timeout_secs(),
            ),
            AiProvider::Anthropic => (
                default_anthropic_model(),
                default_anthropic_endpoint(),
                default_anthropic_timeout_secs(),
            ),
            AiProvider::LMStudio => (
                default_lmstudio_model(),
                default_lmstudio_endpoint(),
                default_timeout_secs(),
            ),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Routing entry mapping conversions to a model and its fallbacks
///
/// Empty `conversion_types` or `complexities` match anything.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelRoute {
    #[serde(default)]
    pub conversion_types: Vec<ConversionType>,

    #[serde(default)]
    pub complexities: Vec<Complexity>,

    pub model: String,

    /// Tried in order when `model` fails
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl ModelRoute {
    pub fn matches(&self, conversion_type: ConversionType, complexity: Complexity) -> bool {
        (self.conversion_types.is_empty() || self.conversion_types.contains(&conversion_type))
            && (self.complexities.is_empty() || self.complexities.contains(&complexity))
    }
}

/// AI conversion configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiConfig {
    /// Master switch; when off every file goes through the rule engine
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Provider to use
    #[serde(default)]
    pub provider: AiProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common settings
    #[serde(default)]
    pub common: AiCommonConfig,

    /// Model routing table, first match wins
    #[serde(default)]
    pub model_routes: Vec<ModelRoute>,
}

/// Settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiCommonConfig {
    /// System prompt template
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retry count for failed requests to one model
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff for retries in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for AiCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Account settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// Name of the login cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Lifetime of a login in hours
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,

    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            session_ttl_hours: default_session_ttl_hours(),
            min_password_length: default_min_password_length(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_converted_dir() -> PathBuf {
    PathBuf::from("converted")
}

fn default_max_upload_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["zip".to_string()]
}

fn default_max_extracted_bytes() -> u64 {
    200 * 1024 * 1024
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_anthropic_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_retry_count() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.2
}

fn default_true() -> bool {
    true
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio serves the OpenAI API on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_ollama_model() -> String {
    "codellama".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; set to the model loaded in LM Studio
    "local-model".to_string()
}

fn default_system_prompt() -> String {
    "You are an expert software engineer. Convert {source_language} code to idiomatic {target_language}. Preserve behavior, keep comments, and answer with the converted code only.".to_string()
}

fn default_cookie_name() -> String {
    "codeconv_session".to_string()
}

fn default_session_ttl_hours() -> i64 {
    24 * 7
}

fn default_min_password_length() -> usize {
    8
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must not be 0"));
        }

        if self.upload.max_upload_bytes == 0 || self.upload.max_extracted_bytes == 0 {
            return Err(anyhow!("Upload size limits must be greater than 0"));
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(anyhow!("At least one upload extension must be allowed"));
        }

        if self.auth.session_ttl_hours <= 0 {
            return Err(anyhow!("Login lifetime must be positive"));
        }

        if self.ai.enabled {
            if self.ai.provider.requires_api_key() && self.ai.get_api_key().is_empty() {
                return Err(anyhow!(
                    "API key is required for {} provider",
                    self.ai.provider.display_name()
                ));
            }

            let endpoint = self.ai.get_endpoint();
            let parsed = url::Url::parse(&endpoint)
                .map_err(|e| anyhow!("Invalid endpoint '{}' for {}: {}", endpoint, self.ai.provider.display_name(), e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(anyhow!("Endpoint must use http or https: {}", endpoint));
            }

            if !(0.0..=1.0).contains(&self.ai.common.temperature) {
                return Err(anyhow!(
                    "Temperature must be between 0.0 and 1.0, got {}",
                    self.ai.common.temperature
                ));
            }

            if let Some(route) = self.ai.model_routes.iter().find(|r| r.model.trim().is_empty()) {
                return Err(anyhow!("Model route without a model: {:?}", route));
            }
        }

        Ok(())
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {:?}: {}", path, e))?;
        serde_json::from_str(&raw).map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::file_utils::FileManager::write_to_file(path, &json)
    }
}

impl AiConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &AiProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the active provider configuration, falling back to its defaults
    pub fn active_provider(&self) -> ProviderConfig {
        let defaults = ProviderConfig::new(self.provider);
        match self.get_active_provider_config() {
            Some(configured) => ProviderConfig {
                provider_type: defaults.provider_type,
                model: non_empty_or(&configured.model, defaults.model),
                api_key: configured.api_key.clone(),
                endpoint: non_empty_or(&configured.endpoint, defaults.endpoint),
                timeout_secs: if configured.timeout_secs > 0 {
                    configured.timeout_secs
                } else {
                    defaults.timeout_secs
                },
                max_tokens: if configured.max_tokens > 0 {
                    configured.max_tokens
                } else {
                    defaults.max_tokens
                },
            },
            None => defaults,
        }
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.active_provider().model
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.active_provider().endpoint
    }
}

fn non_empty_or(value: &str, fallback: String) -> String {
    if value.trim().is_empty() {
        fallback
    } else {
        value.to_string()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: AiProvider::default(),
            available_providers: vec![
                ProviderConfig::new(AiProvider::Ollama),
                ProviderConfig::new(AiProvider::OpenAI),
                ProviderConfig::new(AiProvider::Anthropic),
                ProviderConfig::new(AiProvider::LMStudio),
            ],
            common: AiCommonConfig::default(),
            model_routes: Vec::new(),
        }
    }
}

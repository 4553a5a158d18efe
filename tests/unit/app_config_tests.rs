/*!
 * Tests for application configuration
 */

use codeconv::app_config::{AiProvider, Config, LogLevel, ProviderConfig};
use std::str::FromStr;

use crate::common;

#[test]
fn test_default_shouldUseLocalServerAndZipUploads() {
    let config = Config::default();
    assert_eq!(config.server.bind_address(), "127.0.0.1:5000");
    assert_eq!(config.upload.allowed_extensions, vec!["zip".to_string()]);
    assert_eq!(config.upload.max_upload_bytes, 50 * 1024 * 1024);
    assert_eq!(config.ai.provider, AiProvider::Ollama);
    assert!(config.validate().is_ok());
}

#[test]
fn test_saveAndFromFile_shouldPreserveSettings() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.server.port = 8080;
    config.ai.enabled = false;
    config.log_level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.server.port, 8080);
    assert!(!loaded.ai.enabled);
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", r#"{"server": {"port": 9000}}"#).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.auth.cookie_name, "codeconv_session");
}

#[test]
fn test_fromFile_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_validate_withOpenAiAndNoKey_shouldFailUntilAiDisabled() {
    let mut config = Config::default();
    config.ai.provider = AiProvider::OpenAI;
    assert!(config.validate().is_err());

    config.ai.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withTemperatureOutOfRange_shouldFail() {
    let mut config = Config::default();
    config.ai.common.temperature = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_providerConfig_new_shouldUseProviderDefaults() {
    let lmstudio = ProviderConfig::new(AiProvider::LMStudio);
    assert_eq!(lmstudio.endpoint, "http://localhost:1234/v1");
    assert!(!AiProvider::LMStudio.requires_api_key());
    assert!(AiProvider::Anthropic.requires_api_key());
}

#[test]
fn test_logLevel_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warn);
    assert!(LogLevel::from_str("loud").is_err());
}

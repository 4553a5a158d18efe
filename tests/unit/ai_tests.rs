/*!
 * Tests for model routing and AI-assisted project conversion
 */

use std::sync::Arc;

use codeconv::ai::{AiConverter, ModelSelector};
use codeconv::app_config::{AiCommonConfig, ModelRoute};
use codeconv::conversion::{Complexity, ConversionType, ProjectConverter};
use codeconv::providers::mock::MockModel;

use crate::common;

fn no_retries() -> AiCommonConfig {
    AiCommonConfig {
        retry_count: 0,
        retry_backoff_ms: 0,
        ..AiCommonConfig::default()
    }
}

fn routing_table() -> ModelSelector {
    ModelSelector::new(
        "codellama",
        vec![
            ModelRoute {
                conversion_types: vec![ConversionType::JavaToPython, ConversionType::PythonToJava],
                complexities: vec![],
                model: "java-specialist".to_string(),
                fallbacks: vec!["codellama".to_string()],
            },
            ModelRoute {
                conversion_types: vec![],
                complexities: vec![Complexity::High],
                model: "large-model".to_string(),
                fallbacks: vec![],
            },
        ],
    )
}

#[test]
fn test_select_shouldUseFirstMatchingRoute() {
    let selector = routing_table();

    let choice = selector.select(ConversionType::JavaToPython, Complexity::High);
    assert_eq!(choice.model, "java-specialist");
    assert_eq!(choice.candidates(), vec!["java-specialist", "codellama"]);

    let choice = selector.select(ConversionType::CToPython, Complexity::High);
    assert_eq!(choice.model, "large-model");

    let choice = selector.select(ConversionType::CToPython, Complexity::Low);
    assert_eq!(choice.candidates(), vec!["codellama"]);
}

#[tokio::test]
async fn test_convertProject_withWorkingModel_shouldMarkFilesAsAiConverted() {
    let dir = common::create_temp_dir().unwrap();
    let source = dir.path().join("src");
    common::create_test_file(&source, "main.c", common::sample_c_source()).unwrap();

    let mock = MockModel::fenced();
    let ai = AiConverter::new(Arc::new(mock.clone()), ModelSelector::single("codellama"), &no_retries());
    let report = ProjectConverter::new(Some(ai))
        .convert_project(&source, &dir.path().join("out"), ConversionType::CToPython, true)
        .await
        .unwrap();

    assert!(report.ai_used);
    assert_eq!(report.success_count(), 1);
    let record = &report.files_converted[0];
    assert!(record.ai_used);
    assert_eq!(record.model.as_deref(), Some("codellama"));

    let written = std::fs::read_to_string(dir.path().join("out/main.py")).unwrap();
    assert_eq!(written, "# generated by codellama\nresult = 42\n");
    assert_eq!(mock.request_count(), 1);
    assert!(mock.calls()[0].prompt.contains("printf"));
}

#[tokio::test]
async fn test_convertProject_withFailingModel_shouldFallBackToRules() {
    let dir = common::create_temp_dir().unwrap();
    let source = dir.path().join("src");
    common::create_test_file(&source, "main.c", common::sample_c_source()).unwrap();

    let ai = AiConverter::new(Arc::new(MockModel::failing()), ModelSelector::single("codellama"), &no_retries());
    let report = ProjectConverter::new(Some(ai))
        .convert_project(&source, &dir.path().join("out"), ConversionType::CToPython, true)
        .await
        .unwrap();

    assert!(report.ai_used);
    assert_eq!(report.success_count(), 1);
    let record = &report.files_converted[0];
    assert!(!record.ai_used);
    assert!(record.model.is_none());
    assert!(record.warnings.iter().any(|w| w.contains("rule-based conversion used")));

    let written = std::fs::read_to_string(dir.path().join("out/main.py")).unwrap();
    assert!(written.starts_with("# Converted from C: main.c"));
}

#[tokio::test]
async fn test_convertProject_withUseAiFalse_shouldNeverCallModel() {
    let dir = common::create_temp_dir().unwrap();
    let source = dir.path().join("src");
    common::create_test_file(&source, "main.c", common::sample_c_source()).unwrap();

    let mock = MockModel::working();
    let ai = AiConverter::new(Arc::new(mock.clone()), ModelSelector::single("codellama"), &no_retries());
    let report = ProjectConverter::new(Some(ai))
        .convert_project(&source, &dir.path().join("out"), ConversionType::CToPython, false)
        .await
        .unwrap();

    assert!(!report.ai_used);
    assert_eq!(mock.request_count(), 0);
    assert!(!report.files_converted[0].ai_used);
}

#[tokio::test]
async fn test_convertProject_withBrokenPrimary_shouldUseFallbackModel() {
    let dir = common::create_temp_dir().unwrap();
    let source = dir.path().join("src");
    common::create_test_file(&source, "App.java", "public class App {\n    int x = 1;\n}\n").unwrap();

    let mock = MockModel::working().with_failing_model("java-specialist");
    let ai = AiConverter::new(Arc::new(mock.clone()), routing_table(), &no_retries());
    let report = ProjectConverter::new(Some(ai))
        .convert_project(&source, &dir.path().join("out"), ConversionType::JavaToPython, true)
        .await
        .unwrap();

    let record = &report.files_converted[0];
    assert_eq!(record.target, "App.py");
    assert_eq!(record.model.as_deref(), Some("codellama"));
    assert_eq!(mock.requested_models(), vec!["java-specialist", "codellama"]);
}

#[tokio::test]
async fn test_convertProject_withUnbalancedModelOutput_shouldWarn() {
    let dir = common::create_temp_dir().unwrap();
    let source = dir.path().join("src");
    common::create_test_file(&source, "main.c", common::sample_c_source()).unwrap();

    let mock = MockModel::working().with_custom_response(|_| "def main(:\n    print('hi')\n".to_string());
    let ai = AiConverter::new(Arc::new(mock), ModelSelector::single("codellama"), &no_retries());
    let report = ProjectConverter::new(Some(ai))
        .convert_project(&source, &dir.path().join("out"), ConversionType::CToPython, true)
        .await
        .unwrap();

    let record = &report.files_converted[0];
    assert!(record.ai_used);
    assert!(record.warnings.iter().any(|w| w.contains("Unbalanced")));
}

/*!
 * Command line controller tests
 */

use codeconv::app_controller::Controller;
use codeconv::conversion::{ConversionType, FileStatus, ProjectConverter};
use codeconv::database::{DatabaseConnection, Repository};
use codeconv::session::SessionManager;

use crate::common;

#[tokio::test]
async fn test_convert_withRulesOnly_shouldWriteProjectAndManifests() {
    common::init_test_logging();
    let dir = common::create_temp_dir().unwrap();
    let source = dir.path().join("java_src");
    common::create_test_file(
        &source,
        "com/example/Greeter.java",
        "public class Greeter {\n    public void greet() {\n        System.out.println(\"hi\");\n    }\n}\n",
    )
    .unwrap();
    common::create_test_file(&source, "notes.md", "not a source file").unwrap();
    let target = dir.path().join("js_out");

    let controller = Controller::with_config(common::test_config(dir.path())).unwrap();
    let report = controller
        .convert(source.clone(), target.clone(), ConversionType::JavaToJavascript, false, None)
        .await
        .unwrap();

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.files_converted[0].target, "com/example/Greeter.js");
    assert_eq!(report.files_converted[0].status, FileStatus::Success);
    assert_eq!(report.manifests, vec!["package.json", "README.md"]);

    let converted = std::fs::read_to_string(target.join("com/example/Greeter.js")).unwrap();
    assert!(converted.contains("console.log(\"hi\");"));
    assert!(!target.join("notes.md").exists());
}

#[tokio::test]
async fn test_convert_withMissingSource_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let controller = Controller::with_config(common::test_config(dir.path())).unwrap();

    let result = controller
        .convert(
            dir.path().join("missing"),
            dir.path().join("out"),
            ConversionType::CToPython,
            false,
            None,
        )
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_cleanup_shouldRemoveStaleSessionsAndTheirFiles() {
    let dir = common::create_temp_dir().unwrap();
    let config = common::test_config(dir.path());
    let db_path = config.storage.database_path.clone().unwrap();

    // A converted session on disk
    let session_id = "stale-session";
    let upload_dir = config.storage.upload_dir.join(session_id);
    common::create_test_file(&upload_dir, "extracted/main.c", common::sample_c_source()).unwrap();
    let target_dir = config.storage.converted_dir.join(session_id);
    let report = ProjectConverter::rules_only()
        .convert_project(&upload_dir.join("extracted"), &target_dir, ConversionType::CToPython, false)
        .await
        .unwrap();
    let archive_path = config.storage.converted_dir.join(format!("{}_converted.zip", session_id));
    codeconv::archive::create_zip(&target_dir, &archive_path).unwrap();

    let repo = Repository::new(DatabaseConnection::new(&db_path).unwrap());
    let sessions = SessionManager::new(repo.clone());
    sessions
        .record_conversion(session_id, None, &report, Some(&archive_path.to_string_lossy()))
        .await
        .unwrap();
    sessions.record_conversion("fresh-session", None, &report, None).await.unwrap();
    repo.connection()
        .execute_async(move |conn| {
            Ok(conn.execute(
                "UPDATE conversion_sessions SET created_at = '2000-01-01T00:00:00Z' WHERE id = ?1",
                [session_id],
            )?)
        })
        .await
        .unwrap();

    let controller = Controller::with_config(config).unwrap();
    let removed = controller.cleanup(7).await.unwrap();

    assert_eq!(removed, 1);
    assert!(!upload_dir.exists());
    assert!(!target_dir.exists());
    assert!(!archive_path.exists());
    assert!(sessions.get(session_id).await.unwrap().is_none());
    assert!(sessions.get("fresh-session").await.unwrap().is_some());
}

#[test]
fn test_withConfig_withHostedProviderAndNoKey_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(dir.path());
    config.ai.enabled = true;
    config.ai.provider = codeconv::app_config::AiProvider::Anthropic;

    assert!(Controller::with_config(config).is_err());
}

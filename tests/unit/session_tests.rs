/*!
 * Tests for the conversion result store
 */

use codeconv::conversion::{ConversionReport, ConversionType, FileStatus, ProjectConverter};
use codeconv::database::models::UserInsert;
use codeconv::session::SessionManager;

use crate::common;

async fn convert_sample(root: &std::path::Path) -> ConversionReport {
    let source = root.join("src");
    common::create_test_file(&source, "main.c", common::sample_c_source()).unwrap();
    common::create_test_file(&source, "util/math.c", "int add(int a, int b) {\n    return a + b;\n}\n").unwrap();

    ProjectConverter::rules_only()
        .convert_project(&source, &root.join("out"), ConversionType::CToPython, false)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_recordConversion_anonymous_shouldRoundTripReportWithoutHistory() {
    let dir = common::create_temp_dir().unwrap();
    let report = convert_sample(dir.path()).await;
    let sessions = SessionManager::new_in_memory().unwrap();

    sessions
        .record_conversion("session-1", None, &report, Some("/tmp/session-1.zip"))
        .await
        .unwrap();
    let stored = sessions.get("session-1").await.unwrap().unwrap();

    assert_eq!(stored.conversion_type, ConversionType::CToPython);
    assert_eq!(stored.user_id, None);
    assert_eq!(stored.archive_path.as_deref(), Some("/tmp/session-1.zip"));
    assert_eq!(stored.success_count(), 2);
    assert_eq!(stored.error_count(), 0);
    assert!(!stored.ai_used);

    let targets: Vec<&str> = stored
        .report
        .files_converted
        .iter()
        .map(|r| r.target.as_str())
        .collect();
    assert_eq!(targets, vec!["main.py", "util/math.py"]);
    assert!(stored.report.files_converted.iter().all(|r| r.status == FileStatus::Success));
    assert_eq!(stored.report.manifests, report.manifests);
    assert!(stored.report.next_steps.is_some());

    let analysis = stored.report.analysis.expect("analysis stored");
    assert_eq!(Some(&analysis), report.analysis.as_ref());
    assert_eq!(analysis.source.files_analyzed, 2);
    assert_eq!(analysis.target.files_analyzed, 2);
}

#[tokio::test]
async fn test_recordConversion_forUser_shouldWriteHistoryPerSuccessfulFile() {
    let dir = common::create_temp_dir().unwrap();
    let report = convert_sample(dir.path()).await;
    let sessions = SessionManager::new_in_memory().unwrap();

    let user_id = match sessions
        .repository()
        .insert_user("alice", "alice@example.com", "hash", "2024-01-01T00:00:00Z")
        .await
        .unwrap()
    {
        UserInsert::Created(id) => id,
        other => panic!("unexpected insert outcome {:?}", other),
    };

    sessions
        .record_conversion("session-2", Some(user_id), &report, None)
        .await
        .unwrap();

    let history = sessions.history_for_user(user_id, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|h| h.session_id.as_deref() == Some("session-2")));
    let main = history.iter().find(|h| h.source_path == "main.c").unwrap();
    assert_eq!(main.target_path, "main.py");
    assert!(main.source_code.contains("printf"));
    assert!(main.target_code.contains("print("));
    assert!(!main.ai_used);

    assert!(sessions.history_for_user(user_id + 1, 10).await.unwrap().is_empty());
    assert_eq!(sessions.history_for_user(user_id, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_withUnknownId_shouldReturnNone() {
    let sessions = SessionManager::new_in_memory().unwrap();
    assert!(sessions.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleteSession_shouldRemoveStoredSession() {
    let dir = common::create_temp_dir().unwrap();
    let report = convert_sample(dir.path()).await;
    let sessions = SessionManager::new_in_memory().unwrap();
    sessions.record_conversion("doomed", None, &report, None).await.unwrap();

    assert!(sessions.delete_session("doomed").await.unwrap());
    assert!(!sessions.delete_session("doomed").await.unwrap());
    assert!(sessions.get("doomed").await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleteOlderThan_withFreshSessions_shouldKeepThem() {
    let dir = common::create_temp_dir().unwrap();
    let report = convert_sample(dir.path()).await;
    let sessions = SessionManager::new_in_memory().unwrap();
    sessions.record_conversion("fresh", None, &report, None).await.unwrap();

    let removed = sessions.delete_older_than(7).await.unwrap();

    assert!(removed.is_empty());
    assert!(sessions.get("fresh").await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleteOlderThan_withHugeAge_shouldRemoveNothing() {
    let dir = common::create_temp_dir().unwrap();
    let report = convert_sample(dir.path()).await;
    let sessions = SessionManager::new_in_memory().unwrap();
    sessions.record_conversion("kept", None, &report, None).await.unwrap();

    let removed = sessions.delete_older_than(i64::MAX).await.unwrap();

    assert!(removed.is_empty());
    assert!(sessions.get("kept").await.unwrap().is_some());
}

/*!
 * End-to-end tests of the HTTP interface
 */

use std::collections::BTreeSet;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use codeconv::web::{build_router, AppState};

use crate::common::{self, Part};

fn router(state: &AppState) -> Router {
    build_router(state.clone())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_health_shouldReportHealthy() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let response = router(&state).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_index_shouldOfferEveryConversionType() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let response = router(&state).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_text(response).await;
    for value in ["c_to_python", "typescript_to_python", "javascript_to_java"] {
        assert!(html.contains(value), "index should offer {}", value);
    }
}

#[tokio::test]
async fn test_upload_withCProject_shouldConvertAndServeArchive() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());
    let archive = common::zip_bytes(&[("main.c", common::sample_c_source())]);

    let response = router(&state)
        .oneshot(common::upload_request(&[
            Part::File("project_file", "project.zip", &archive),
            Part::Text("conversion_type", "c_to_python"),
            Part::Text("use_ai", "false"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["success"], true);
    let session_id = json["session_id"].as_str().unwrap().to_string();
    assert_eq!(json["download_url"], format!("/download/{}", session_id));

    let results = &json["results"];
    assert_eq!(results["ai_used"], false);
    let files = results["files_converted"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["source"], "main.c");
    assert_eq!(files[0]["target"], "main.py");
    assert_eq!(files[0]["status"], "success");
    assert!(results["errors"].as_array().unwrap().is_empty());

    let converted = std::fs::read_to_string(state.target_dir(&session_id).join("main.py")).unwrap();
    assert!(converted.starts_with("# Converted from C: main.c"));

    let response = router(&state)
        .oneshot(get(&format!("/download/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains(&format!("converted_project_{}.zip", session_id)));

    let names: BTreeSet<String> = common::zip_entry_names(&common::body_bytes(response).await)
        .into_iter()
        .collect();
    let expected: BTreeSet<String> = ["main.py", "requirements.txt", "README.md"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(names, expected);

    let response = router(&state)
        .oneshot(get(&format!("/results/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_text(response).await;
    assert!(html.contains("main.py"));
    assert!(html.contains("<h2>Project analysis</h2>"));
    assert!(html.contains("Risk score"));
}

#[tokio::test]
async fn test_upload_withMixedProject_shouldArchiveExactlySuccessesAndManifests() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());
    let archive = common::zip_bytes(&[
        ("main.c", common::sample_c_source()),
        ("util/helper.c", "int twice(int x) {\n    return x * 2;\n}\n"),
        ("blob.c", "int x;\0\u{1}\u{2}"),
        ("notes.txt", "not a source file"),
    ]);

    let response = router(&state)
        .oneshot(common::upload_request(&[
            Part::File("project_file", "mixed.zip", &archive),
            Part::Text("conversion_type", "c_to_python"),
            Part::Text("use_ai", "false"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    let session_id = json["session_id"].as_str().unwrap().to_string();
    let results = &json["results"];

    // One record per recognized source file, failures included
    let files = results["files_converted"].as_array().unwrap();
    assert_eq!(files.len(), 3);
    let errors = results["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["file"], "blob.c");

    let mut expected: BTreeSet<String> = files
        .iter()
        .filter(|f| f["status"] == "success")
        .map(|f| f["target"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(expected.len(), 2);
    expected.extend(
        results["manifests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m.as_str().unwrap().to_string()),
    );

    let response = router(&state)
        .oneshot(get(&format!("/download/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let names: BTreeSet<String> = common::zip_entry_names(&common::body_bytes(response).await)
        .into_iter()
        .collect();

    assert_eq!(names, expected);
    assert!(names.contains("util/helper.py"));
    assert!(!names.contains("blob.py"));
    assert!(!names.iter().any(|n| n.starts_with("notes")));
}

#[tokio::test]
async fn test_download_withMissingArchive_shouldRebuildIt() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());
    let archive = common::zip_bytes(&[("app/util.c", "int add(int a, int b) {\n    return a + b;\n}\n")]);

    let response = router(&state)
        .oneshot(common::upload_request(&[
            Part::File("project_file", "app.zip", &archive),
            Part::Text("conversion_type", "c_to_python"),
            Part::Text("use_ai", "0"),
        ]))
        .await
        .unwrap();
    let json = common::body_json(response).await;
    let session_id = json["session_id"].as_str().unwrap().to_string();

    std::fs::remove_file(state.archive_path(&session_id)).unwrap();

    let response = router(&state)
        .oneshot(get(&format!("/download/{}", session_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let names = common::zip_entry_names(&common::body_bytes(response).await);
    assert!(names.iter().any(|n| n == "util.py"));
    assert!(state.archive_path(&session_id).exists());
}

#[tokio::test]
async fn test_upload_withDisallowedExtension_shouldReturn400AndLeaveNothing() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let response = router(&state)
        .oneshot(common::upload_request(&[
            Part::File("project_file", "project.rar", b"rar!"),
            Part::Text("conversion_type", "c_to_python"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Invalid file type"));
    assert_eq!(common::entry_count(&state.upload_dir()), 0);
}

#[tokio::test]
async fn test_upload_overSizeLimit_shouldReturn413AndLeaveNothing() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(dir.path());
    config.upload.max_upload_bytes = 1024;
    let state = common::test_state_with_config(config);

    let payload = vec![0u8; 2048];

    let response = router(&state)
        .oneshot(common::upload_request(&[
            Part::File("project_file", "project.zip", &payload),
            Part::Text("conversion_type", "c_to_python"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = common::body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(common::entry_count(&state.upload_dir()), 0);
    assert_eq!(common::entry_count(&state.converted_dir()), 0);
}

#[tokio::test]
async fn test_upload_withoutFile_shouldReturn400() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let response = router(&state)
        .oneshot(common::upload_request(&[Part::Text("conversion_type", "c_to_python")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["error"], "No file selected");
}

#[tokio::test]
async fn test_upload_withUnsupportedType_shouldReturn400() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());
    let archive = common::zip_bytes(&[("main.c", common::sample_c_source())]);

    let response = router(&state)
        .oneshot(common::upload_request(&[
            Part::File("project_file", "project.zip", &archive),
            Part::Text("conversion_type", "cobol_to_rust"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("cobol_to_rust"));
    assert_eq!(common::entry_count(&state.upload_dir()), 0);
}

#[tokio::test]
async fn test_download_withUnknownSession_shouldReturn404() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let response = router(&state).oneshot(get("/download/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router(&state).oneshot(get("/results/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_apiConvert_withMissingParameters_shouldReturn400() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"source_dir": "/tmp/x"}"#))
        .unwrap();
    let response = router(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = common::body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Missing required parameters");
}

#[tokio::test]
async fn test_apiConvert_withServerPaths_shouldReturnReport() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());
    let source = dir.path().join("py_src");
    common::create_test_file(&source, "app.py", "def greet(name):\n    print(name)\n").unwrap();
    let target = dir.path().join("js_out");

    let body = serde_json::json!({
        "source_dir": source.to_string_lossy(),
        "target_dir": target.to_string_lossy(),
        "conversion_type": "python_to_javascript",
        "use_ai": false,
    });
    let request = Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::body_json(response).await;
    assert_eq!(json["files_converted"][0]["target"], "app.js");
    assert!(target.join("app.js").exists());
    assert!(target.join("package.json").exists());
}

#[tokio::test]
async fn test_history_anonymous_shouldRedirectToLogin() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let response = router(&state).oneshot(get("/history")).await.unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_accountFlow_shouldRegisterLoginAndShowHistory() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());

    let response = router(&state)
        .oneshot(form_post(
            "/register",
            "username=frank&email=frank%40example.com&password=password123",
        ))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login?registered=1");

    let response = router(&state)
        .oneshot(form_post("/login", "username=frank&password=password123"))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/history");
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    assert!(cookie.starts_with("codeconv_session="));

    // A logged-in upload lands in the history
    let archive = common::zip_bytes(&[("main.c", common::sample_c_source())]);
    let mut request = common::upload_request(&[
        Part::File("project_file", "project.zip", &archive),
        Part::Text("conversion_type", "c_to_python"),
        Part::Text("use_ai", "false"),
    ]);
    request.headers_mut().insert(header::COOKIE, cookie.parse().unwrap());
    let response = router(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router(&state)
        .oneshot(get_with_cookie("/history", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = common::body_text(response).await;
    assert!(html.contains("frank"));
    assert!(html.contains("main.py"));

    let response = router(&state)
        .oneshot(get_with_cookie("/logout", &cookie))
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");

    let response = router(&state)
        .oneshot(get_with_cookie("/history", &cookie))
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_withWrongPassword_shouldReturn401Page() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());
    state
        .auth
        .register("grace", "grace@example.com", "password123")
        .await
        .unwrap();

    let response = router(&state)
        .oneshot(form_post("/login", "username=grace&password=nope-nope"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let html = common::body_text(response).await;
    assert!(html.contains("Invalid username or password"));
}

#[tokio::test]
async fn test_register_withTakenUsername_shouldReturn409Page() {
    let dir = common::create_temp_dir().unwrap();
    let state = common::test_state(dir.path());
    state
        .auth
        .register("heidi", "heidi@example.com", "password123")
        .await
        .unwrap();

    let response = router(&state)
        .oneshot(form_post(
            "/register",
            "username=heidi&email=other%40example.com&password=password123",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

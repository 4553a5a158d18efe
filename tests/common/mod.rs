/*!
 * Common test utilities for the codeconv test suite
 */

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use std::fs;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::net::TcpListener;
use zip::write::SimpleFileOptions;

use codeconv::app_config::Config;
use codeconv::auth::PasswordHasher;
use codeconv::conversion::ProjectConverter;
use codeconv::database::Repository;
use codeconv::web::AppState;

/// Multipart boundary used by `multipart_body`
pub const BOUNDARY: &str = "codeconv-test-boundary";

/// Routes `log` output through the test harness; `RUST_LOG=debug` shows it
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, relative: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Small C program used across the suite
pub fn sample_c_source() -> &'static str {
    "#include <stdio.h>\n\nint main() {\n    int count = 0;\n    printf(\"Hello\\n\");\n    return 0;\n}\n"
}

/// Builds an in-memory zip archive from `(path, content)` pairs
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Lists the entry names of a zip archive held in memory
pub fn zip_entry_names(data: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::io::Cursor::new(data.to_vec())).unwrap();
    archive.file_names().map(|n| n.to_string()).collect()
}

/// Configuration with every storage path inside `root` and AI switched off
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.storage.upload_dir = root.join("uploads");
    config.storage.converted_dir = root.join("converted");
    config.storage.database_path = Some(root.join("codeconv.db"));
    config.ai.enabled = false;
    config
}

/// Application state backed by an in-memory database and the rule engine
pub fn test_state(root: &Path) -> AppState {
    test_state_with_config(test_config(root))
}

pub fn test_state_with_config(config: Config) -> AppState {
    init_test_logging();
    fs::create_dir_all(&config.storage.upload_dir).unwrap();
    fs::create_dir_all(&config.storage.converted_dir).unwrap();
    AppState::new(
        config,
        Repository::new_in_memory().unwrap(),
        ProjectConverter::rules_only(),
        PasswordHasher::with_params(1024, 1, 1).unwrap(),
    )
}

/// A multipart form part
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

/// Encodes parts as a `multipart/form-data` body delimited by `BOUNDARY`
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// `POST /upload` request carrying the given parts
pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Collects a response body
pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Serves `router` on an ephemeral local port and returns its base URL
pub async fn spawn_stub_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Number of entries directly under `dir`, zero when it does not exist
pub fn entry_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

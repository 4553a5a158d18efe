/*!
 * Conversion endpoints: upload, results, download, JSON API and health.
 */

use anyhow::Context;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use log::{debug, info, warn};
use std::path::PathBuf;

use super::extractors::MaybeUser;
use super::models::{ApiConvertRequest, HealthResponse, UploadResponse};
use super::pages;
use super::AppState;
use crate::archive;
use crate::conversion::{ConversionReport, ConversionType};
use crate::errors::{AppError, UploadError};
use crate::file_utils::FileManager;
use crate::session::ConversionSession;
use crate::upload::{self, PreparedUpload};

const DEFAULT_CONVERSION_TYPE: &str = "c_to_python";

/// Form flags arrive as strings; anything but an explicit "yes" is false
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "on" | "yes")
}

fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { limit }.into()
    } else {
        AppError::BadRequest(err.body_text())
    }
}

pub async fn index(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(pages::index_page(user.as_ref()))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Fields of the upload form
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    conversion_type: Option<String>,
    use_ai: Option<String>,
}

async fn read_upload_form(multipart: &mut Multipart, limit: u64) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "project_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                form.file = Some((filename, data));
            }
            "conversion_type" => {
                form.conversion_type = Some(field.text().await.map_err(|e| multipart_error(e, limit))?);
            }
            "use_ai" => {
                form.use_ai = Some(field.text().await.map_err(|e| multipart_error(e, limit))?);
            }
            other => debug!("Ignoring form field {}", other),
        }
    }

    Ok(form)
}

/// `POST /upload`: store, unpack, convert, archive and record a project
pub async fn upload(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let limit = state.upload_policy.max_upload_bytes;
    let form = read_upload_form(&mut multipart, limit).await?;

    let (filename, data) = form.file.ok_or(UploadError::NoFile)?;
    let conversion_type: ConversionType = form
        .conversion_type
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_CONVERSION_TYPE)
        .parse()?;
    let use_ai = form.use_ai.as_deref().map(parse_flag).unwrap_or(true);

    let prepared = upload::prepare(&state.upload_policy, &state.upload_dir(), &filename, data).await?;
    let user_id = user.as_ref().map(|u| u.id);

    match convert_upload(&state, &prepared, conversion_type, use_ai, user_id).await {
        Ok(session) => Ok(Json(UploadResponse {
            success: true,
            download_url: format!("/download/{}", session.id),
            session_id: session.id,
            results: session.report,
        })),
        Err(err) => {
            discard_upload(&state, &prepared);
            Err(err)
        }
    }
}

async fn convert_upload(
    state: &AppState,
    prepared: &PreparedUpload,
    conversion_type: ConversionType,
    use_ai: bool,
    user_id: Option<i64>,
) -> Result<ConversionSession, AppError> {
    let target_dir = state.target_dir(&prepared.session_id);
    let report = state
        .converter
        .convert_project(&prepared.project_dir, &target_dir, conversion_type, use_ai)
        .await?;

    let archive_path = state.archive_path(&prepared.session_id);
    build_archive(target_dir, archive_path.clone()).await?;

    let session = state
        .sessions
        .record_conversion(
            &prepared.session_id,
            user_id,
            &report,
            Some(&archive_path.to_string_lossy()),
        )
        .await?;

    info!(
        "Session {} converted: {} succeeded, {} failed",
        session.id,
        session.success_count(),
        session.error_count()
    );
    Ok(session)
}

async fn build_archive(target_dir: PathBuf, archive_path: PathBuf) -> Result<usize, AppError> {
    let count = tokio::task::spawn_blocking(move || archive::create_zip(&target_dir, &archive_path))
        .await
        .context("Archive task panicked")??;
    Ok(count)
}

/// Remove everything a failed upload left on disk
fn discard_upload(state: &AppState, prepared: &PreparedUpload) {
    for dir in [prepared.session_dir.clone(), state.target_dir(&prepared.session_id)] {
        if let Err(e) = FileManager::remove_dir_if_exists(&dir) {
            warn!("Failed to remove {:?}: {:#}", dir, e);
        }
    }
    let archive_path = state.archive_path(&prepared.session_id);
    if FileManager::file_exists(&archive_path) {
        if let Err(e) = std::fs::remove_file(&archive_path) {
            warn!("Failed to remove {:?}: {}", archive_path, e);
        }
    }
}

/// `GET /download/{session_id}`
pub async fn download(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    let session = state
        .sessions
        .get(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Converted project not found".to_string()))?;

    let archive_path = session
        .archive_path
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| state.archive_path(&session.id));

    if !FileManager::file_exists(&archive_path) {
        let target_dir = PathBuf::from(&session.target_dir);
        if !FileManager::dir_exists(&target_dir) {
            return Err(AppError::NotFound("Converted project not found".to_string()));
        }
        info!("Rebuilding archive of session {}", session.id);
        build_archive(target_dir, archive_path.clone()).await?;
    }

    let data = tokio::fs::read(&archive_path).await?;
    let disposition = format!("attachment; filename=\"converted_project_{}.zip\"", session.id);

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// `GET /results/{session_id}`
pub async fn results(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    match state.sessions.get(&session_id).await? {
        Some(session) => Ok(Html(pages::results_page(&session, user.as_ref())).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Html(pages::not_found_page("Results not found")),
        )
            .into_response()),
    }
}

/// `POST /api/convert`: convert a directory already on the server
pub async fn api_convert(
    State(state): State<AppState>,
    Json(request): Json<ApiConvertRequest>,
) -> Result<Json<ConversionReport>, AppError> {
    let (Some(source_dir), Some(target_dir), Some(conversion_type)) =
        (request.source_dir, request.target_dir, request.conversion_type)
    else {
        return Err(AppError::BadRequest("Missing required parameters".to_string()));
    };

    let conversion_type: ConversionType = conversion_type.parse()?;
    let use_ai = request.use_ai.unwrap_or(true);

    let report = state
        .converter
        .convert_project(
            &PathBuf::from(source_dir),
            &PathBuf::from(target_dir),
            conversion_type,
            use_ai,
        )
        .await?;

    Ok(Json(report))
}

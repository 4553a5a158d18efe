/*!
 * Accepting uploaded project archives.
 *
 * An upload is validated (file name, extension allow-list, size ceiling)
 * before anything touches the disk. Accepted archives get a fresh session id,
 * are stored under `<upload_dir>/<session_id>/` and unpacked into
 * `extracted/`. If unpacking fails the whole session directory is removed so
 * a rejected upload leaves nothing behind.
 */

use bytes::Bytes;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::app_config::UploadConfig;
use crate::archive;
use crate::errors::UploadError;
use crate::file_utils::FileManager;

/// Limits applied to every upload
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    // @field: Lower-case extensions without the dot
    pub allowed_extensions: Vec<String>,
    pub max_upload_bytes: u64,
    pub max_extracted_bytes: u64,
}

impl UploadPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_upload_bytes: config.max_upload_bytes,
            max_extracted_bytes: config.max_extracted_bytes,
        }
    }

    /// Check a file name and size against the policy
    ///
    /// # Returns
    /// * `Result<String, UploadError>` - The sanitized file name
    pub fn validate(&self, filename: &str, size: u64) -> Result<String, UploadError> {
        let filename = sanitize_filename(filename);
        if filename.is_empty() {
            return Err(UploadError::NoFile);
        }

        let extension = Path::new(&filename)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if !self.allowed_extensions.contains(&extension) {
            return Err(UploadError::DisallowedExtension {
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }

        if size > self.max_upload_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_upload_bytes,
            });
        }

        Ok(filename)
    }
}

/// Keep only the final path component and replace characters that are not
/// safe in a file name
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// A stored and unpacked upload, ready for conversion
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub session_id: String,
    // @field: `<upload_dir>/<session_id>`
    pub session_dir: PathBuf,
    pub archive_path: PathBuf,
    // @field: Project root after descending through wrapper directories
    pub project_dir: PathBuf,
}

/// Validate, store and unpack an uploaded archive
pub async fn prepare(
    policy: &UploadPolicy,
    upload_root: &Path,
    filename: &str,
    data: Bytes,
) -> Result<PreparedUpload, UploadError> {
    let filename = policy.validate(filename, data.len() as u64)?;
    if data.is_empty() {
        return Err(UploadError::NoFile);
    }

    let session_id = Uuid::new_v4().to_string();
    let session_dir = upload_root.join(&session_id);
    let archive_path = session_dir.join(&filename);
    let extract_dir = session_dir.join("extracted");
    let max_extracted = policy.max_extracted_bytes;

    info!("Accepted upload {} ({} bytes) as session {}", filename, data.len(), session_id);

    let unpack = {
        let session_dir = session_dir.clone();
        let archive_path = archive_path.clone();
        move || -> Result<PathBuf, UploadError> {
            std::fs::create_dir_all(&session_dir)?;
            std::fs::write(&archive_path, &data)?;
            let files = archive::extract_zip(&archive_path, &extract_dir, max_extracted)?;
            debug!("Unpacked {} file(s) from {:?}", files, archive_path);
            FileManager::descend_single_dir(&extract_dir)
                .map_err(|e| UploadError::Io(format!("{:#}", e)))
        }
    };

    let outcome = tokio::task::spawn_blocking(unpack)
        .await
        .map_err(|e| UploadError::Io(e.to_string()))
        .and_then(|r| r);

    match outcome {
        Ok(project_dir) => Ok(PreparedUpload {
            session_id,
            session_dir,
            archive_path,
            project_dir,
        }),
        Err(err) => {
            warn!("Discarding upload session {}: {}", session_id, err);
            if let Err(cleanup) = FileManager::remove_dir_if_exists(&session_dir) {
                warn!("Failed to remove {:?}: {:#}", session_dir, cleanup);
            }
            Err(err)
        }
    }
}

/*!
 * Web interface.
 *
 * An axum router serving the upload form, the conversion endpoints, results
 * and downloads, and the account pages guarding the conversion history.
 * Conversions run to completion inside their request.
 */

use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use crate::ai::AiConverter;
use crate::app_config::Config;
use crate::auth::{AuthService, PasswordHasher};
use crate::conversion::ProjectConverter;
use crate::database::{DatabaseConnection, Repository};
use crate::file_utils::FileManager;
use crate::session::SessionManager;
use crate::upload::UploadPolicy;

pub mod auth_handlers;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pages;
pub mod routes;

pub use routes::build_router;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub converter: ProjectConverter,
    pub sessions: SessionManager,
    pub auth: AuthService,
    pub upload_policy: UploadPolicy,
}

impl AppState {
    /// Assemble the state from its parts
    pub fn new(config: Config, repo: Repository, converter: ProjectConverter, hasher: PasswordHasher) -> Self {
        let auth = AuthService::new(repo.clone(), hasher, &config.auth);
        let upload_policy = UploadPolicy::from_config(&config.upload);

        Self {
            config: Arc::new(config),
            converter,
            sessions: SessionManager::new(repo),
            auth,
            upload_policy,
        }
    }

    /// Open the database, build the AI converter and create the storage directories
    pub fn from_config(config: Config) -> Result<Self> {
        let db = match &config.storage.database_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        info!("Using database {:?}", db.path());

        FileManager::ensure_dir(&config.storage.upload_dir)
            .with_context(|| format!("Failed to create upload directory {:?}", config.storage.upload_dir))?;
        FileManager::ensure_dir(&config.storage.converted_dir).with_context(|| {
            format!("Failed to create converted directory {:?}", config.storage.converted_dir)
        })?;

        let ai = AiConverter::from_config(&config.ai);
        match &ai {
            Some(ai) => info!(
                "AI conversion through {} (default model {})",
                ai.backend_name(),
                ai.selector().default_model()
            ),
            None => info!("AI conversion disabled, using conversion rules only"),
        }
        let converter = ProjectConverter::new(ai);
        Ok(Self::new(config, Repository::new(db), converter, PasswordHasher::new()))
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.config.storage.upload_dir.clone()
    }

    pub fn converted_dir(&self) -> PathBuf {
        self.config.storage.converted_dir.clone()
    }

    /// Output directory of a session
    pub fn target_dir(&self, session_id: &str) -> PathBuf {
        self.config.storage.converted_dir.join(session_id)
    }

    /// Zip of a session's converted project
    pub fn archive_path(&self, session_id: &str) -> PathBuf {
        self.config
            .storage
            .converted_dir
            .join(format!("{}_converted.zip", session_id))
    }
}

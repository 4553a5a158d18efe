use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::signal;

use crate::ai::AiConverter;
use crate::app_config::Config;
use crate::conversion::{ConversionReport, ConversionType, ProjectConverter};
use crate::database::{DatabaseConnection, Repository};
use crate::file_utils::FileManager;
use crate::session::SessionManager;
use crate::web::{self, AppState};

// @module: Application controller for the web server and the command line

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the web server until Ctrl+C or SIGTERM
    pub async fn serve(&self) -> Result<()> {
        let state = AppState::from_config(self.config.clone())?;
        let router = web::build_router(state);

        let addr: SocketAddr = self
            .config
            .server
            .bind_address()
            .parse()
            .with_context(|| format!("Invalid bind address {}", self.config.server.bind_address()))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("Listening on http://{}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Convert a project directory from the command line
    ///
    /// # Returns
    /// * `Result<ConversionReport>` - Per-file outcome of the conversion
    pub async fn convert(
        &self,
        source_dir: PathBuf,
        target_dir: PathBuf,
        conversion_type: ConversionType,
        use_ai: bool,
        model_override: Option<String>,
    ) -> Result<ConversionReport> {
        let start_time = Instant::now();

        let ai = if use_ai {
            AiConverter::from_config(&self.config.ai).map(|ai| match model_override {
                Some(model) => ai.with_model_override(model),
                None => ai,
            })
        } else {
            None
        };
        let converter = ProjectConverter::new(ai);

        let progress_bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let report = converter
            .convert_project_with_progress(&source_dir, &target_dir, conversion_type, use_ai, |done, total, file| {
                progress_bar.set_length(total as u64);
                progress_bar.set_position(done as u64);
                progress_bar.set_message(file.to_string());
            })
            .await;
        progress_bar.finish_and_clear();
        let report = report?;

        Self::print_summary(&report);
        info!(
            "Conversion complete in {}",
            Self::format_duration(start_time.elapsed())
        );

        Ok(report)
    }

    fn print_summary(report: &ConversionReport) {
        println!(
            "{}: {} converted, {} failed (AI {})",
            report.conversion_type.label(),
            report.success_count(),
            report.error_count(),
            if report.ai_used { "on" } else { "off" }
        );
        for record in &report.files_converted {
            let by = record.model.as_deref().unwrap_or("rules");
            println!("  [{}] {} -> {} ({})", record.status, record.source, record.target, by);
            for warning in &record.warnings {
                println!("      warning: {}", warning);
            }
        }
        for error in &report.errors {
            println!("  error: {}: {}", error.file, error.error);
        }
        for warning in &report.warnings {
            println!("  warning: {}", warning);
        }
        if !report.manifests.is_empty() {
            println!("  manifests: {}", report.manifests.join(", "));
        }
        if let Some(analysis) = &report.analysis {
            println!(
                "  risk score: {} -> {} ({} -> {} finding(s))",
                analysis.source_security.risk_score,
                analysis.target_security.risk_score,
                analysis.source_security.findings.len(),
                analysis.target_security.findings.len()
            );
            for advice in &analysis.recommendations {
                println!("  recommendation: {}", advice);
            }
        }
        println!("  output: {}", report.target_dir);
    }

    /// Delete conversion sessions older than `older_than_days` with their files
    ///
    /// # Returns
    /// * `Result<usize>` - Number of sessions removed
    pub async fn cleanup(&self, older_than_days: i64) -> Result<usize> {
        let db = match &self.config.storage.database_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };
        let sessions = SessionManager::new(Repository::new(db));

        let removed = sessions.delete_older_than(older_than_days).await?;
        for session in &removed {
            let upload_dir = self.config.storage.upload_dir.join(&session.id);
            for dir in [upload_dir, PathBuf::from(&session.target_dir)] {
                Self::remove_dir_logged(&dir);
            }
            if let Some(archive) = &session.archive_path {
                let archive = Path::new(archive);
                if FileManager::file_exists(archive) {
                    if let Err(e) = std::fs::remove_file(archive) {
                        warn!("Failed to remove {:?}: {}", archive, e);
                    }
                }
            }
        }

        info!("Cleanup removed {} session(s)", removed.len());
        Ok(removed.len())
    }

    fn remove_dir_logged(dir: &Path) {
        match FileManager::remove_dir_if_exists(dir) {
            Ok(true) => info!("Removed {:?}", dir),
            Ok(false) => {}
            Err(e) => error!("Failed to remove {:?}: {:#}", dir, e),
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/*!
 * Session manager for conversion results.
 *
 * This module handles:
 * - Recording finished conversions under their session id
 * - Rebuilding reports for the results and download endpoints
 * - Per-user conversion history
 * - Session cleanup and maintenance
 */

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use log::{debug, info, warn};

use crate::conversion::{ConversionReport, ConversionType, FileConversionRecord, FileError};
use crate::database::models::{
    format_timestamp, now_timestamp, ConversionSessionRecord, FileErrorRow, FileRecordRow,
    HistoryRecord,
};
use crate::database::repository::{ConversionBundle, Repository};

use super::models::{ConversionSession, RemovedSession};

/// Session manager for the conversion result store
#[derive(Clone)]
pub struct SessionManager {
    /// Repository for database operations
    repo: Repository,
}

impl SessionManager {
    /// Create a new session manager with the given repository
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a new session manager with the default database
    pub fn new_default() -> Result<Self> {
        let repo = Repository::new_default()?;
        Ok(Self::new(repo))
    }

    /// Create a new session manager with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let repo = Repository::new_in_memory()?;
        Ok(Self::new(repo))
    }

    /// Get the underlying repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Store a finished conversion
    ///
    /// History entries are written only for logged-in users, one per
    /// successfully converted file.
    pub async fn record_conversion(
        &self,
        session_id: &str,
        user_id: Option<i64>,
        report: &ConversionReport,
        archive_path: Option<&str>,
    ) -> Result<ConversionSession> {
        let created_at = now_timestamp();
        let conversion_type = report.conversion_type;

        let next_steps = match &report.next_steps {
            Some(steps) => Some(serde_json::to_string(steps).context("Failed to encode next steps")?),
            None => None,
        };
        let analysis = match &report.analysis {
            Some(analysis) => Some(serde_json::to_string(analysis).context("Failed to encode analysis")?),
            None => None,
        };

        let session = ConversionSessionRecord {
            id: session_id.to_string(),
            user_id,
            conversion_type: conversion_type.as_str().to_string(),
            source_dir: report.source_dir.clone(),
            target_dir: report.target_dir.clone(),
            archive_path: archive_path.map(str::to_string),
            ai_used: report.ai_used,
            warnings: report.warnings.clone(),
            manifests: report.manifests.clone(),
            next_steps,
            analysis,
            created_at: created_at.clone(),
        };

        let files = report
            .files_converted
            .iter()
            .enumerate()
            .map(|(seq, record)| FileRecordRow {
                session_id: session_id.to_string(),
                seq_num: seq as i64,
                source_path: record.source.clone(),
                target_path: record.target.clone(),
                status: record.status,
                warnings: record.warnings.clone(),
                ai_used: record.ai_used,
                model: record.model.clone(),
            })
            .collect();

        let errors = report
            .errors
            .iter()
            .map(|e| FileErrorRow {
                session_id: session_id.to_string(),
                file: e.file.clone(),
                error: e.error.clone(),
            })
            .collect();

        let history = match user_id {
            Some(user_id) => Self::history_rows(session_id, user_id, report, &created_at),
            None => Vec::new(),
        };

        debug!(
            "Recording session {} ({} files, {} history entries)",
            session_id,
            report.files_converted.len(),
            history.len()
        );

        self.repo
            .save_conversion(ConversionBundle {
                session,
                files,
                errors,
                history,
            })
            .await?;

        info!(
            "Stored conversion session {} ({}: {} converted, {} failed)",
            session_id,
            conversion_type,
            report.success_count(),
            report.error_count()
        );

        Ok(ConversionSession {
            id: session_id.to_string(),
            user_id,
            conversion_type,
            source_dir: report.source_dir.clone(),
            target_dir: report.target_dir.clone(),
            archive_path: archive_path.map(str::to_string),
            ai_used: report.ai_used,
            created_at,
            report: report.clone(),
        })
    }

    fn history_rows(
        session_id: &str,
        user_id: i64,
        report: &ConversionReport,
        created_at: &str,
    ) -> Vec<HistoryRecord> {
        let source_language = report.conversion_type.source_language().display_name();
        let target_language = report.conversion_type.target_language().display_name();

        report
            .files_converted
            .iter()
            .filter(|record| record.is_success())
            .filter_map(|record| {
                let artifact = record.artifact.as_ref()?;
                Some(HistoryRecord {
                    id: 0,
                    user_id,
                    session_id: Some(session_id.to_string()),
                    source_path: record.source.clone(),
                    target_path: record.target.clone(),
                    source_code: artifact.source_code.clone(),
                    target_code: artifact.target_code.clone(),
                    source_language: source_language.to_string(),
                    target_language: target_language.to_string(),
                    conversion_time_ms: artifact.duration_ms,
                    output_non_empty: artifact.output_non_empty,
                    delimiters_balanced: artifact.delimiters_balanced,
                    ai_used: record.ai_used,
                    model: record.model.clone(),
                    created_at: created_at.to_string(),
                })
            })
            .collect()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Load a stored conversion by session id
    pub async fn get(&self, session_id: &str) -> Result<Option<ConversionSession>> {
        let Some(bundle) = self.repo.get_conversion(session_id).await? else {
            return Ok(None);
        };

        let session = bundle.session;
        let conversion_type: ConversionType = session
            .conversion_type
            .parse()
            .with_context(|| format!("Session {} has an unknown conversion type", session.id))?;

        let next_steps = session.next_steps.as_deref().and_then(|raw| {
            serde_json::from_str(raw)
                .map_err(|e| warn!("Ignoring unreadable next steps of session {}: {}", session.id, e))
                .ok()
        });
        let analysis = session.analysis.as_deref().and_then(|raw| {
            serde_json::from_str(raw)
                .map_err(|e| warn!("Ignoring unreadable analysis of session {}: {}", session.id, e))
                .ok()
        });

        let report = ConversionReport {
            conversion_type,
            source_dir: session.source_dir.clone(),
            target_dir: session.target_dir.clone(),
            files_converted: bundle
                .files
                .into_iter()
                .map(|row| FileConversionRecord {
                    source: row.source_path,
                    target: row.target_path,
                    status: row.status,
                    warnings: row.warnings,
                    ai_used: row.ai_used,
                    model: row.model,
                    artifact: None,
                })
                .collect(),
            errors: bundle
                .errors
                .into_iter()
                .map(|row| FileError {
                    file: row.file,
                    error: row.error,
                })
                .collect(),
            warnings: session.warnings.clone(),
            manifests: session.manifests.clone(),
            ai_used: session.ai_used,
            next_steps,
            analysis,
        };

        Ok(Some(ConversionSession {
            id: session.id,
            user_id: session.user_id,
            conversion_type,
            source_dir: session.source_dir,
            target_dir: session.target_dir,
            archive_path: session.archive_path,
            ai_used: session.ai_used,
            created_at: session.created_at,
            report,
        }))
    }

    /// Most recent history entries of a user
    pub async fn history_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<HistoryRecord>> {
        self.repo.history_for_user(user_id, limit).await
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Delete sessions older than `days` days
    ///
    /// # Returns
    /// * `Result<Vec<RemovedSession>>` - Removed sessions, so their directories
    ///   and archives can be deleted by the caller
    pub async fn delete_older_than(&self, days: i64) -> Result<Vec<RemovedSession>> {
        // An age reaching past the earliest representable time matches nothing
        let cutoff = match TimeDelta::try_days(days.max(0)).and_then(|age| Utc::now().checked_sub_signed(age)) {
            Some(cutoff) => format_timestamp(cutoff),
            None => {
                debug!("No session can be older than {} day(s)", days);
                return Ok(Vec::new());
            }
        };
        let stale = self.repo.sessions_created_before(&cutoff).await?;

        let mut removed = Vec::with_capacity(stale.len());
        for session in stale {
            if self.repo.delete_conversion(&session.id).await? {
                removed.push(RemovedSession {
                    id: session.id,
                    source_dir: session.source_dir,
                    target_dir: session.target_dir,
                    archive_path: session.archive_path,
                });
            }
        }

        if !removed.is_empty() {
            info!("Removed {} conversion session(s) older than {} day(s)", removed.len(), days);
        }

        Ok(removed)
    }

    /// Delete one session
    pub async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let deleted = self.repo.delete_conversion(session_id).await?;
        if deleted {
            info!("Deleted conversion session {}", session_id);
        }
        Ok(deleted)
    }
}

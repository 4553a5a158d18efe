/*!
 * Session-specific models.
 *
 * These structures provide a higher-level view over the raw database
 * records: a stored conversion comes back as the same report the
 * converter produced.
 */

use serde::{Deserialize, Serialize};

use crate::conversion::{ConversionReport, ConversionType};

/// A stored conversion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSession {
    /// Session ID (UUID v4)
    pub id: String,
    /// Owner, when the upload was made while logged in
    pub user_id: Option<i64>,
    pub conversion_type: ConversionType,
    pub source_dir: String,
    pub target_dir: String,
    /// Zip of the converted project
    pub archive_path: Option<String>,
    /// True when AI conversion was enabled for the job
    pub ai_used: bool,
    pub created_at: String,
    /// Per-file results, errors, warnings and guidance
    pub report: ConversionReport,
}

impl ConversionSession {
    pub fn success_count(&self) -> usize {
        self.report.success_count()
    }

    pub fn error_count(&self) -> usize {
        self.report.error_count()
    }
}

/// What a cleanup pass removed from the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedSession {
    pub id: String,
    pub source_dir: String,
    pub target_dir: String,
    pub archive_path: Option<String>,
}

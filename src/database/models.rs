/*!
 * Database entity models.
 *
 * These structures map directly to database tables. Timestamps are stored as
 * RFC 3339 UTC strings with second precision so they sort lexically.
 */

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::conversion::FileStatus;

/// Format a timestamp the way it is stored
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time in storage format
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

/// Outcome of inserting a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInsert {
    Created(i64),
    UsernameTaken,
    EmailTaken,
}

/// Login backing a cookie
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSessionRecord {
    /// Hex SHA-256 of the cookie token
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

impl AuthSessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match parse_timestamp(&self.expires_at) {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }
}

/// Stored conversion job
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSessionRecord {
    pub id: String,
    pub user_id: Option<i64>,
    /// Wire identifier, e.g. `c_to_python`
    pub conversion_type: String,
    pub source_dir: String,
    pub target_dir: String,
    pub archive_path: Option<String>,
    pub ai_used: bool,
    pub warnings: Vec<String>,
    pub manifests: Vec<String>,
    /// Serialized next-steps guidance
    pub next_steps: Option<String>,
    /// Serialized project analysis
    pub analysis: Option<String>,
    pub created_at: String,
}

/// Stored per-file result
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecordRow {
    pub session_id: String,
    pub seq_num: i64,
    pub source_path: String,
    pub target_path: String,
    pub status: FileStatus,
    pub warnings: Vec<String>,
    pub ai_used: bool,
    pub model: Option<String>,
}

/// Stored per-file failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileErrorRow {
    pub session_id: String,
    pub file: String,
    pub error: String,
}

/// One converted file in a user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Row id; ignored on insert
    pub id: i64,
    pub user_id: i64,
    pub session_id: Option<String>,
    pub source_path: String,
    pub target_path: String,
    pub source_code: String,
    pub target_code: String,
    pub source_language: String,
    pub target_language: String,
    pub conversion_time_ms: i64,
    pub output_non_empty: bool,
    pub delimiters_balanced: bool,
    pub ai_used: bool,
    pub model: Option<String>,
    pub created_at: String,
}

/// Encode a list column
pub(crate) fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a list column, treating malformed content as empty
pub(crate) fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

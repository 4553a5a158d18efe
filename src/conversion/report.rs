/*!
 * Result types produced by a project conversion.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ConversionType;
use super::analysis::ProjectAnalysis;
use super::guidance::NextSteps;

/// Outcome of converting one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Error,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Success => write!(f, "success"),
            FileStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for FileStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(FileStatus::Success),
            "error" => Ok(FileStatus::Error),
            _ => Err(anyhow::anyhow!("Invalid file status: {}", s)),
        }
    }
}

/// Code and measurements kept for the conversion history of logged-in users
#[derive(Debug, Clone, Default)]
pub struct FileArtifact {
    pub source_code: String,
    pub target_code: String,
    pub duration_ms: i64,
    pub output_non_empty: bool,
    pub delimiters_balanced: bool,
}

/// Per-file entry of a conversion report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConversionRecord {
    /// Source path relative to the project root, `/` separated
    pub source: String,
    /// Target path relative to the output root, `/` separated
    pub target: String,
    pub status: FileStatus,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// True when the written code came from an AI model
    #[serde(default)]
    pub ai_used: bool,
    /// Model that produced the code, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip)]
    pub artifact: Option<FileArtifact>,
}

impl FileConversionRecord {
    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Success
    }
}

/// Error entry for a file that could not be converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Full result of a project conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub conversion_type: ConversionType,
    pub source_dir: String,
    pub target_dir: String,
    pub files_converted: Vec<FileConversionRecord>,
    pub errors: Vec<FileError>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Manifest files written next to the converted sources
    #[serde(default)]
    pub manifests: Vec<String>,
    /// True when AI conversion was enabled for the job
    pub ai_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<NextSteps>,
    /// Metrics and security scan of the source and converted trees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ProjectAnalysis>,
}

impl ConversionReport {
    pub fn success_count(&self) -> usize {
        self.files_converted.iter().filter(|r| r.is_success()).count()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Target paths of every successfully converted file
    pub fn success_targets(&self) -> Vec<&str> {
        self.files_converted
            .iter()
            .filter(|r| r.is_success())
            .map(|r| r.target.as_str())
            .collect()
    }
}

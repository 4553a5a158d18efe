/*!
 * Source-to-source conversion.
 *
 * A conversion type is an ordered pair of languages. It decides which files of
 * an uploaded project are picked up, what extension the converted files get,
 * which prompt is sent to an AI model and which rule set is used when no model
 * answers.
 *
 * - `rules`: deterministic regex rewriting per language pair
 * - `prompts`: AI prompt templates
 * - `dispatcher`: walks a project and converts every recognized file
 * - `scaffold`: writes target-language manifests
 * - `validation`: post-conversion sanity checks
 * - `guidance`: next-steps advice attached to every report
 * - `analysis`: complexity metrics and a vulnerability scan of both trees
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConversionError;

pub mod analysis;
pub mod dispatcher;
pub mod guidance;
pub mod prompts;
pub mod report;
pub mod rules;
pub mod scaffold;
pub mod validation;

pub use dispatcher::ProjectConverter;
pub use report::{ConversionReport, FileConversionRecord, FileError, FileStatus};

/// Programming languages handled by the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Python,
    JavaScript,
    TypeScript,
    Java,
}

impl Language {
    // @returns: Human readable language name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Java => "Java",
        }
    }

    // @returns: Line comment prefix
    pub fn line_comment(&self) -> &'static str {
        match self {
            Self::Python => "#",
            _ => "//",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name().to_lowercase())
    }
}

/// Expected difficulty of a conversion, used for model routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Sources shorter than this are considered low complexity
    pub const LOW_LIMIT: usize = 500;
    /// Sources shorter than this (and not low) are considered medium complexity
    pub const MEDIUM_LIMIT: usize = 2000;

    /// Classify a source file by its length in characters
    pub fn from_source(source: &str) -> Self {
        let len = source.chars().count();
        if len < Self::LOW_LIMIT {
            Self::Low
        } else if len < Self::MEDIUM_LIMIT {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Complexity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(anyhow::anyhow!("Invalid complexity: {}", s)),
        }
    }
}

/// Supported language-pair conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionType {
    CToPython,
    PythonToJavascript,
    PythonToJava,
    JavaToPython,
    JavascriptToPython,
    TypescriptToPython,
    JavaToJavascript,
    JavascriptToJava,
}

impl ConversionType {
    /// Every supported conversion, in the order they are offered to users
    pub const ALL: [ConversionType; 8] = [
        Self::CToPython,
        Self::PythonToJavascript,
        Self::PythonToJava,
        Self::JavaToPython,
        Self::JavascriptToPython,
        Self::TypescriptToPython,
        Self::JavaToJavascript,
        Self::JavascriptToJava,
    ];

    // @returns: Wire identifier, e.g. `c_to_python`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CToPython => "c_to_python",
            Self::PythonToJavascript => "python_to_javascript",
            Self::PythonToJava => "python_to_java",
            Self::JavaToPython => "java_to_python",
            Self::JavascriptToPython => "javascript_to_python",
            Self::TypescriptToPython => "typescript_to_python",
            Self::JavaToJavascript => "java_to_javascript",
            Self::JavascriptToJava => "javascript_to_java",
        }
    }

    // @returns: Source file extensions, without the leading dot
    pub fn source_extensions(&self) -> &'static [&'static str] {
        match self {
            Self::CToPython => &["c", "h"],
            Self::PythonToJavascript | Self::PythonToJava => &["py"],
            Self::JavaToPython | Self::JavaToJavascript => &["java"],
            Self::JavascriptToPython | Self::JavascriptToJava => &["js", "ts", "jsx", "tsx"],
            Self::TypescriptToPython => &["ts", "tsx"],
        }
    }

    // @returns: Extension given to converted files, without the leading dot
    pub fn target_extension(&self) -> &'static str {
        match self.target_language() {
            Language::Python => "py",
            Language::JavaScript => "js",
            Language::Java => "java",
            Language::C => "c",
            Language::TypeScript => "ts",
        }
    }

    pub fn source_language(&self) -> Language {
        match self {
            Self::CToPython => Language::C,
            Self::PythonToJavascript | Self::PythonToJava => Language::Python,
            Self::JavaToPython | Self::JavaToJavascript => Language::Java,
            Self::JavascriptToPython | Self::JavascriptToJava => Language::JavaScript,
            Self::TypescriptToPython => Language::TypeScript,
        }
    }

    pub fn target_language(&self) -> Language {
        match self {
            Self::CToPython
            | Self::JavaToPython
            | Self::JavascriptToPython
            | Self::TypescriptToPython => Language::Python,
            Self::PythonToJavascript | Self::JavaToJavascript => Language::JavaScript,
            Self::PythonToJava | Self::JavascriptToJava => Language::Java,
        }
    }

    /// Nominal complexity of the language pair
    pub fn complexity(&self) -> Complexity {
        match self {
            Self::CToPython
            | Self::PythonToJavascript
            | Self::JavascriptToPython
            | Self::TypescriptToPython => Complexity::Medium,
            Self::PythonToJava
            | Self::JavaToPython
            | Self::JavaToJavascript
            | Self::JavascriptToJava => Complexity::High,
        }
    }

    // @returns: Label shown in the upload form, e.g. "C → Python"
    pub fn label(&self) -> String {
        format!(
            "{} → {}",
            self.source_language().display_name(),
            self.target_language().display_name()
        )
    }

    /// Whether a file extension belongs to this conversion's sources
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.source_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Comma separated list of all wire identifiers
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ConversionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConversionType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                ConversionError::UnsupportedType(format!(
                    "{} (supported: {})",
                    s,
                    Self::supported_list()
                ))
            })
    }
}

/*!
 * Request and response bodies of the HTTP interface.
 */

use serde::{Deserialize, Serialize};

use crate::conversion::ConversionReport;

/// Body of every failed JSON request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Answer to a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub session_id: String,
    pub results: ConversionReport,
    pub download_url: String,
}

/// Body of `POST /api/convert`; every field but `use_ai` is required
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConvertRequest {
    pub source_dir: Option<String>,
    pub target_dir: Option<String>,
    pub conversion_type: Option<String>,
    pub use_ai: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Query of `GET /login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    /// Set after a successful registration
    #[serde(default)]
    pub registered: Option<String>,
}

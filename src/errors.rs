/*!
 * Error types for the codeconv application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with model provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The model answered but produced no usable code
    #[error("Model {0} returned an empty response")]
    EmptyResponse(String),
}

/// Errors that can occur while converting a single source file
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The requested conversion type is not one of the supported pairs
    #[error("Unsupported conversion type: {0}")]
    UnsupportedType(String),

    /// The source file contains NUL bytes and cannot be treated as text
    #[error("File appears to be binary: {0}")]
    BinaryContent(String),

    /// No Java class name can be derived from the file name
    #[error("Cannot derive a Java class name from file name: {0}")]
    InvalidClassName(String),

    /// Error from the AI model
    #[error("AI conversion failed: {0}")]
    Ai(#[from] ProviderError),
}

/// Errors raised while accepting and unpacking an uploaded project archive
#[derive(Error, Debug)]
pub enum UploadError {
    /// The multipart body carried no project file
    #[error("No file selected")]
    NoFile,

    /// The archive extension is not in the allow-list
    #[error("Invalid file type '{extension}', allowed: {allowed}")]
    DisallowedExtension {
        /// Extension found on the uploaded file
        extension: String,
        /// Comma separated allow-list
        allowed: String,
    },

    /// The upload exceeds the configured size ceiling
    #[error("File too large, maximum upload size is {limit} bytes")]
    TooLarge {
        /// Ceiling in bytes
        limit: u64,
    },

    /// The archive could not be read
    #[error("Failed to extract project archive: {0}")]
    InvalidArchive(String),

    /// An archive entry points outside of the extraction directory
    #[error("Archive entry escapes the extraction directory: {0}")]
    UnsafeEntry(String),

    /// The unpacked content exceeds the configured ceiling
    #[error("Extracted project exceeds {limit} bytes")]
    ExtractedTooLarge {
        /// Ceiling in bytes
        limit: u64,
    },

    /// Filesystem failure while storing the upload
    #[error("Failed to store upload: {0}")]
    Io(String),
}

/// Errors from registration, login and session lookup
#[derive(Error, Debug)]
pub enum AuthError {
    /// Username does not satisfy the naming rules
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Email address is malformed
    #[error("Invalid email address")]
    InvalidEmail,

    /// Password is shorter than the configured minimum
    #[error("Password must be at least {min} characters")]
    WeakPassword {
        /// Minimum accepted length
        min: usize,
    },

    /// Username already registered
    #[error("Username is already taken")]
    UsernameTaken,

    /// Email already registered
    #[error("Email is already registered")]
    EmailTaken,

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Password hashing or verification failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Persistence failure
    #[error("Account storage error: {0}")]
    Storage(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from conversion
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error from the upload layer
    #[error("{0}")]
    Upload(#[from] UploadError),

    /// Error from the account layer
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request is malformed
    #[error("{0}")]
    BadRequest(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<std::io::Error> for UploadError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

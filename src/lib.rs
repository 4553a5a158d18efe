/*!
 * # codeconv - source project converter
 *
 * A library and web application that converts source projects between
 * programming languages with an AI model, falling back to textual
 * conversion rules.
 *
 * ## Features
 *
 * - Eight conversion types between C, Python, Java, JavaScript and TypeScript
 * - AI conversion through various providers:
 *   - Ollama (local LLM)
 *   - OpenAI API (and OpenAI-compatible servers such as LM Studio)
 *   - Anthropic API
 * - Rule-based conversion when AI is disabled or fails
 * - Target-language manifests and a downloadable archive per conversion
 * - Accounts with a per-user conversion history
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `conversion`: Conversion types and the project converter:
 *   - `conversion::dispatcher`: Per-file conversion of a whole project
 *   - `conversion::rules`: Textual conversion rules per language pair
 *   - `conversion::scaffold`: Target-language manifests
 *   - `conversion::validation`: Sanity checks on converted code
 *   - `conversion::guidance`: Next-steps advice for reports
 * - `ai`: Model routing, prompting and answer clean-up
 * - `providers`: Client implementations for various LLM providers
 * - `upload`, `archive`: Accepting uploads and zip handling
 * - `database`, `session`: SQLite result store and history
 * - `auth`: Accounts and logins
 * - `web`: axum router, handlers and pages
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod ai;
pub mod app_config;
pub mod app_controller;
pub mod archive;
pub mod auth;
pub mod conversion;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod session;
pub mod upload;
pub mod web;

// Re-export main types for easier usage
pub use app_config::Config;
pub use conversion::{ConversionReport, ConversionType, ProjectConverter};
pub use errors::{AppError, AuthError, ConversionError, ProviderError, UploadError};

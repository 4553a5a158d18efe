/*!
 * Route table of the web interface.
 */

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use super::middleware::logging_middleware;
use super::{auth_handlers, handlers, AppState};

/// Room for multipart boundaries and the non-file form fields
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .upload_policy
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/download/{session_id}", get(handlers::download))
        .route("/results/{session_id}", get(handlers::results))
        .route("/api/convert", post(handlers::api_convert))
        .route("/health", get(handlers::health))
        .route("/login", get(auth_handlers::login_form).post(auth_handlers::login))
        .route("/register", get(auth_handlers::register_form).post(auth_handlers::register))
        .route("/logout", get(auth_handlers::logout).post(auth_handlers::logout))
        .route("/history", get(auth_handlers::history))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

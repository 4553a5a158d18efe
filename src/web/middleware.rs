/*!
 * Request logging middleware.
 */

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use log::{debug, info, warn};
use std::time::Instant;

/// Log method, path, status and duration of every request
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start_time = Instant::now();

    debug!("--> {} {}", method, path);

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = start_time.elapsed().as_millis();

    if status.is_server_error() {
        warn!("{} {} -> {} ({} ms)", method, path, status, elapsed_ms);
    } else {
        info!("{} {} -> {} ({} ms)", method, path, status, elapsed_ms);
    }

    response
}

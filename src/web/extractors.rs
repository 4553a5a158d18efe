/*!
 * Cookie-based user extractors.
 */

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use log::warn;

use super::AppState;
use crate::database::models::UserRecord;

/// Read one cookie from the request headers
pub fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let prefix = format!("{}=", cookie_name);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(&prefix))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Option<UserRecord> {
    let token = cookie_value(&parts.headers, &state.config.auth.cookie_name)?;
    match state.auth.user_for_token(&token).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Login lookup failed: {}", e);
            None
        }
    }
}

/// A logged-in user; anonymous requests are redirected to `/login`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state)
            .await
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to("/login").into_response())
    }
}

/// The logged-in user, if any
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserRecord>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_user(parts, state).await))
    }
}

/*!
 * Account pages: registration, login, logout and conversion history.
 */

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use log::warn;

use super::extractors::{cookie_value, CurrentUser};
use super::models::{LoginForm, LoginQuery, RegisterForm};
use super::pages;
use super::AppState;
use crate::errors::AppError;

/// Entries shown on the history page
const HISTORY_LIMIT: usize = 100;

fn session_cookie(name: &str, token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, token, max_age_secs
    )
}

pub async fn login_form(Query(query): Query<LoginQuery>) -> Html<String> {
    let notice = query
        .registered
        .is_some()
        .then_some("Registration complete, you can log in now.");
    Html(pages::login_page(None, notice))
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.auth.login(&form.username, &form.password).await {
        Ok(session) => {
            let cookie = session_cookie(
                &state.config.auth.cookie_name,
                &session.token,
                state.auth.session_ttl().num_seconds(),
            );
            ([(header::SET_COOKIE, cookie)], Redirect::to("/history")).into_response()
        }
        Err(err) => {
            let err = AppError::from(err);
            (err.status_code(), Html(pages::login_page(Some(&err.to_string()), None))).into_response()
        }
    }
}

pub async fn register_form() -> Html<String> {
    Html(pages::register_page(None))
}

pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    match state
        .auth
        .register(&form.username, &form.email, &form.password)
        .await
    {
        Ok(_) => Redirect::to("/login?registered=1").into_response(),
        Err(err) => {
            let err = AppError::from(err);
            (err.status_code(), Html(pages::register_page(Some(&err.to_string())))).into_response()
        }
    }
}

/// Forget the login and clear the cookie; works when logged out too
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie_name = &state.config.auth.cookie_name;
    if let Some(token) = cookie_value(&headers, cookie_name) {
        if let Err(e) = state.auth.logout(&token).await {
            warn!("Logout failed: {}", e);
        }
    }

    (
        [(header::SET_COOKIE, session_cookie(cookie_name, "", 0))],
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn history(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Response {
    match state.sessions.history_for_user(user.id, HISTORY_LIMIT).await {
        Ok(entries) => Html(pages::history_page(&user, &entries)).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::{
    api::state::AppState,
    auth::{Credentials, CurrentUser},
    error::{AppError, Result},
};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: Option<CurrentUser>,
}

fn session_token(state: &AppState, jar: &CookieJar) -> Option<String> {
    let name = state.service_context.sessions.cookie_name();
    jar.get(name).map(|c| c.value().to_string())
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<CurrentUser>> {
    let token = session_token(&state, &jar);

    state.service_context.sessions
        .current_user(token.as_deref())
        .await
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::BadRequest("Username and password are required".to_string()));
    }

    let outcome = state.service_context.sessions.login(&credentials).await?;

    let jar = outcome
        .cookies
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: outcome.user,
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    let token = session_token(&state, &jar);
    let cookie = state.service_context.sessions.logout(token.as_deref()).await;

    (jar.add(cookie), StatusCode::NO_CONTENT)
}

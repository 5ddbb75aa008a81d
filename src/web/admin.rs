//! Admin area: login form, dashboard, cache purge, logout.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{middleware::auth::SessionToken, state::AppState},
    auth::{Credentials, CurrentUser},
    cache::CacheStats,
    domain::ContactSubmission,
    error::AppError,
    web::templates::{HtmlTemplate, LayoutContext},
};

const RECENT_SUBMISSIONS: i64 = 20;

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub layout: LayoutContext,
    pub csrf_token: String,
    pub username: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: LayoutContext,
    pub csrf_token: String,
    pub user: CurrentUser,
    pub submissions: Vec<ContactSubmission>,
    pub submission_count: i64,
    pub cache: CacheStats,
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub purged: Option<usize>,
}

/// Only site-relative targets are followed after login.
pub fn safe_next(next: Option<&str>, fallback: String) -> String {
    match next.map(str::trim) {
        Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') => {
            next.to_string()
        }
        _ => fallback,
    }
}

async fn render_login(
    state: &AppState,
    status: StatusCode,
    username: String,
    next: String,
    error: Option<String>,
) -> Response {
    let layout = LayoutContext::load(state, "/admin/login", "Sign in").await;
    let template = LoginTemplate {
        layout,
        csrf_token: state.service_context.csrf.generate_token(),
        username,
        next,
        error,
    };
    (status, HtmlTemplate(template)).into_response()
}

// GET /admin/login
pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref(), state.link("/admin"));

    // Already signed in: skip the form
    let sessions = &state.service_context.sessions;
    let token = jar.get(sessions.cookie_name()).map(|c| c.value().to_string());
    if sessions.current_user(token.as_deref()).await.is_some() {
        return Redirect::to(&next).into_response();
    }

    render_login(&state, StatusCode::OK, String::new(), next, None).await
}

// POST /admin/login
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = safe_next(Some(&form.next), state.link("/admin"));
    let username = form.username.trim().to_string();

    if !state.service_context.csrf.validate_token(&form.csrf_token) {
        tracing::warn!("Admin login rejected: invalid CSRF token");
        return render_login(
            &state,
            StatusCode::FORBIDDEN,
            username,
            next,
            Some("Your form expired. Please try again.".to_string()),
        )
        .await;
    }

    if username.is_empty() || form.password.is_empty() {
        return render_login(
            &state,
            StatusCode::UNPROCESSABLE_ENTITY,
            username,
            next,
            Some("Enter your username and password.".to_string()),
        )
        .await;
    }

    let credentials = Credentials {
        username: username.clone(),
        password: form.password,
    };

    match state.service_context.sessions.login(&credentials).await {
        Ok(outcome) => {
            let jar = outcome
                .cookies
                .into_iter()
                .fold(jar, |jar, cookie| jar.add(cookie));
            (jar, Redirect::to(&next)).into_response()
        }
        Err(AppError::Unauthorized) => {
            render_login(
                &state,
                StatusCode::UNAUTHORIZED,
                username,
                next,
                Some("Invalid username or password.".to_string()),
            )
            .await
        }
        Err(e) => {
            tracing::error!("Admin login failed: {}", e);
            render_login(
                &state,
                StatusCode::BAD_GATEWAY,
                username,
                next,
                Some("Sign-in is unavailable right now. Please try again later.".to_string()),
            )
            .await
        }
    }
}

// POST /admin/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Form(form): Form<CsrfForm>,
) -> Response {
    if !state.service_context.csrf.validate_token(&form.csrf_token) {
        return (StatusCode::FORBIDDEN, "Invalid CSRF token").into_response();
    }

    let cookie = state.service_context.sessions.logout(token.as_deref()).await;
    (jar.add(cookie), Redirect::to(&state.link("/"))).into_response()
}

// GET /admin
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let ctx = &state.service_context;

    let submissions = ctx.contact.recent(RECENT_SUBMISSIONS).await.unwrap_or_else(|e| {
        tracing::error!("Failed to load contact submissions: {}", e);
        Vec::new()
    });
    let submission_count = ctx.contact.count().await.unwrap_or_else(|e| {
        tracing::error!("Failed to count contact submissions: {}", e);
        0
    });

    let layout = LayoutContext::load(&state, "/admin", "Admin").await;

    HtmlTemplate(DashboardTemplate {
        layout,
        csrf_token: ctx.csrf.generate_token(),
        user,
        submissions,
        submission_count,
        cache: ctx.cache.stats().await,
        notice: query
            .purged
            .map(|n| format!("Cleared {} cached content entries.", n)),
    })
    .into_response()
}

// POST /admin/cache/purge
pub async fn purge_cache(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<CsrfForm>,
) -> Response {
    if !state.service_context.csrf.validate_token(&form.csrf_token) {
        return (StatusCode::FORBIDDEN, "Invalid CSRF token").into_response();
    }

    // Content only; cached sessions stay valid
    let removed = state.service_context.cache.invalidate_prefix("cms:").await;
    tracing::info!("{} purged {} cached content entries", user.username, removed);

    Redirect::to(&format!("{}?purged={}", state.link("/admin"), removed)).into_response()
}

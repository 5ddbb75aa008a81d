use askama::Template;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::{
    api::state::AppState,
    web::templates::{HtmlTemplate, LayoutContext},
};

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: LayoutContext,
    pub path: String,
}

/// The static "not found" view, with a 404 status.
pub async fn render(state: &AppState, path: &str) -> Response {
    let layout = LayoutContext::load(state, path, "Page not found").await;
    (
        StatusCode::NOT_FOUND,
        HtmlTemplate(NotFoundTemplate {
            layout,
            path: path.to_string(),
        }),
    )
        .into_response()
}

/// Catch-all for unmatched paths.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    tracing::debug!("No route for {}", uri.path());
    render(&state, uri.path()).await
}

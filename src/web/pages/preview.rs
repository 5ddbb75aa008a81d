use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    api::state::AppState,
    service::{normalize_slug, PreviewContent, PreviewKind},
    web::pages::{events, gallery, not_found, page},
};

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub slug: Option<String>,
    pub token: Option<String>,
}

// GET /preview/:kind?slug=..&token=..
pub async fn preview_page(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Response {
    let current_path = format!("/preview/{}", kind);

    let kind: PreviewKind = match kind.parse() {
        Ok(kind) => kind,
        Err(_) => return not_found::render(&state, &current_path).await,
    };
    let slug = match kind {
        PreviewKind::Page => normalize_slug(query.slug.as_deref()),
        _ => match query.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => return not_found::render(&state, &current_path).await,
        },
    };

    let content = state
        .service_context
        .content
        .preview(kind, &slug, query.token)
        .await;

    match content {
        Ok(Some(PreviewContent::Page(p))) => page::render_page(&state, &current_path, p, true).await,
        Ok(Some(PreviewContent::Event(e))) => events::render_event(&state, &current_path, e, true).await,
        Ok(Some(PreviewContent::Gallery(g))) => gallery::render_album(&state, &current_path, g, true).await,
        Ok(None) => not_found::render(&state, &current_path).await,
        Err(e) => {
            tracing::warn!("Preview of {:?} {} failed: {}", kind, slug, e);
            not_found::render(&state, &current_path).await
        }
    }
}

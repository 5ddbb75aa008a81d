use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    api::state::AppState,
    domain::{FeaturedEvent, Page},
    service::{normalize_slug, HOME_SLUG},
    web::{
        pages::{
            not_found,
            sections::{render_sections, SectionData},
        },
        templates::{HtmlTemplate, LayoutContext},
    },
};

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub layout: LayoutContext,
    pub heading: String,
    pub description: Option<String>,
    pub featured: Vec<FeaturedEvent>,
    pub sections: Vec<String>,
}

// GET /
pub async fn home(State(state): State<AppState>) -> Response {
    resolve(&state, "/", None).await
}

// GET /pages/:slug
pub async fn page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let current_path = format!("/pages/{}", slug);
    resolve(&state, &current_path, Some(&slug)).await
}

/// Fetch the CMS page for `slug` (home when absent) and render it, or the
/// not-found view when the CMS has no such page or cannot be reached.
pub async fn resolve(state: &AppState, current_path: &str, slug: Option<&str>) -> Response {
    let slug = normalize_slug(slug);

    match state.service_context.content.page(&slug).await {
        Ok(Some(page)) => render_page(state, current_path, page, false).await,
        Ok(None) => {
            tracing::debug!("No CMS page for slug {}", slug);
            not_found::render(state, current_path).await
        }
        Err(e) => {
            tracing::warn!("Failed to load page {}: {}", slug, e);
            not_found::render(state, current_path).await
        }
    }
}

/// Render a page's sections, in CMS order, inside the layout.
pub async fn render_page(state: &AppState, current_path: &str, page: Page, preview: bool) -> Response {
    let content = &state.service_context.content;
    let today = Utc::now().date_naive();

    let mut data = SectionData {
        base_path: state.base_path(),
        today: Some(today),
        ..Default::default()
    };
    if page.needs_events() {
        data.events = content.events().await.unwrap_or_else(|e| {
            tracing::warn!("Events unavailable for page {}: {}", page.slug, e);
            Vec::new()
        });
    }
    if page.needs_sponsors() {
        data.sponsor_groups = content.sponsor_groups().await.unwrap_or_else(|e| {
            tracing::warn!("Sponsors unavailable for page {}: {}", page.slug, e);
            Vec::new()
        });
    }
    if page.needs_announcements() {
        data.announcements = content.announcements().await.unwrap_or_default();
    }

    let sections = match render_sections(&page.sections, &data) {
        Ok(sections) => sections,
        Err(e) => {
            tracing::error!("Failed to render page {}: {}", page.slug, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response();
        }
    };

    let featured = if page.slug == HOME_SLUG {
        content
            .featured_events()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|e| e.date >= today)
            .collect()
    } else {
        Vec::new()
    };

    let mut layout = LayoutContext::load(state, current_path, page.title.clone()).await;
    layout.preview = preview;

    HtmlTemplate(PageTemplate {
        layout,
        heading: page.title,
        description: page.description,
        featured,
        sections,
    })
    .into_response()
}

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    api::state::AppState,
    domain::GalleryAlbum,
    web::{
        pages::not_found,
        templates::{HtmlTemplate, LayoutContext},
    },
};

#[derive(Template)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub layout: LayoutContext,
    pub albums: Vec<GalleryAlbum>,
    pub unavailable: bool,
}

#[derive(Template)]
#[template(path = "gallery_detail.html")]
pub struct GalleryDetailTemplate {
    pub layout: LayoutContext,
    pub album: GalleryAlbum,
}

// GET /gallery
pub async fn gallery_page(State(state): State<AppState>) -> Response {
    let (albums, unavailable) = match state.service_context.content.galleries().await {
        Ok(albums) => (albums, false),
        Err(e) => {
            tracing::warn!("Galleries unavailable: {}", e);
            (Vec::new(), true)
        }
    };

    let layout = LayoutContext::load(&state, "/gallery", "Gallery").await;

    HtmlTemplate(GalleryTemplate {
        layout,
        albums,
        unavailable,
    })
    .into_response()
}

// GET /gallery/:slug
pub async fn gallery_detail_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    let current_path = format!("/gallery/{}", slug);

    match state.service_context.content.gallery(&slug).await {
        Ok(Some(album)) => render_album(&state, &current_path, album, false).await,
        Ok(None) => not_found::render(&state, &current_path).await,
        Err(e) => {
            tracing::warn!("Failed to load gallery {}: {}", slug, e);
            not_found::render(&state, &current_path).await
        }
    }
}

pub async fn render_album(state: &AppState, current_path: &str, album: GalleryAlbum, preview: bool) -> Response {
    let mut layout = LayoutContext::load(state, current_path, album.title.clone()).await;
    layout.preview = preview;

    HtmlTemplate(GalleryDetailTemplate { layout, album }).into_response()
}

pub mod api;
pub mod auth;
pub mod cache;
pub mod cms;
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;
pub mod web;

use std::sync::Arc;

use axum::{http::Uri, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{api::state::AppState, config::Settings, service::ServiceContext};

/// Build the complete application router: API routes, site pages and the
/// production base path.
pub fn build_router(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let state = AppState::new(service_context, settings.clone());

    let app = api::create_app(state.clone())
        .merge(web::create_web_routes(state.clone()))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    match settings.server.effective_base_path() {
        Some(prefix) => Router::new()
            .nest(&prefix, app)
            .fallback(move |uri: Uri| async move {
                web::pages::not_found::render(&state, uri.path()).await
            }),
        None => app,
    }
}

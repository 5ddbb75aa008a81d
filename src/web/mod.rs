pub mod admin;
pub mod pages;
pub mod templates;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::api::{middleware::auth::require_session_redirect, state::AppState};

pub fn create_web_routes(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/logout", post(admin::logout))
        .route("/admin/cache/purge", post(admin::purge_cache))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session_redirect,
        ));

    Router::new()
        // Public pages
        .route("/", get(pages::page::home))
        .route("/pages/:slug", get(pages::page::page))
        .route("/events", get(pages::events::events_page))
        .route("/events/:slug", get(pages::events::event_detail_page))
        .route("/vendors", get(pages::vendors::vendors_page))
        .route("/sponsors", get(pages::sponsors::sponsors_page))
        .route("/gallery", get(pages::gallery::gallery_page))
        .route("/gallery/:slug", get(pages::gallery::gallery_detail_page))
        .route(
            "/contact",
            get(pages::contact::contact_page).post(pages::contact::contact_submit),
        )
        .route("/preview/:kind", get(pages::preview::preview_page))

        // Admin
        .route(
            "/admin/login",
            get(admin::login_page).post(admin::login_submit),
        )
        .merge(admin_routes)

        .nest_service("/static", ServeDir::new("static"))
        .fallback(pages::not_found::fallback)
        .with_state(state)
}

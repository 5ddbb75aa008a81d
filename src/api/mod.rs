pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};

use state::AppState;

pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(handlers::root::health_check))
        .route("/api", get(handlers::root::api_info))

        // API routes
        .nest("/api", api_routes())

        // Add state to the router
        .with_state(app_state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/content/:resource", get(handlers::content::get_resource))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
}

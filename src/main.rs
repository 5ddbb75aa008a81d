use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use townhall::{
    auth::HttpAuthBackend,
    build_router,
    cms::HttpCmsClient,
    config::Settings,
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "townhall=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    if settings.is_production() && settings.security.csrf_secret == Settings::default().security.csrf_secret {
        tracing::warn!("Running in production with the default CSRF secret; set TOWNHALL__SECURITY__CSRF_SECRET");
    }

    tracing::info!(
        "Starting Townhall server on {}:{} ({})",
        settings.server.host,
        settings.server.port,
        settings.server.environment
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Upstream services
    let content_source = Arc::new(HttpCmsClient::new(&settings.cms, &settings.sponsors)?);
    let auth_backend = Arc::new(HttpAuthBackend::new(&settings.auth)?);

    let service_context = Arc::new(ServiceContext::new(
        content_source,
        auth_backend,
        db_pool,
        &settings,
    )?);

    // Warm the query cache from the last run
    match service_context.cache.hydrate().await {
        Ok(n) => tracing::info!("Restored {} cached content queries", n),
        Err(e) => tracing::warn!("Failed to restore query cache: {}", e),
    }

    let settings = Arc::new(settings);
    let app = build_router(service_context, settings.clone());

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    match settings.server.effective_base_path() {
        Some(prefix) => tracing::info!(
            "Server listening on http://{}:{}{}",
            settings.server.host,
            settings.server.port,
            prefix
        ),
        None => tracing::info!(
            "Server listening on http://{}:{}",
            settings.server.host,
            settings.server.port
        ),
    }

    axum::serve(listener, app).await?;

    Ok(())
}

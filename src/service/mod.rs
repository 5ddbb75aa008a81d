pub mod contact_service;
pub mod content_service;

use std::sync::Arc;

use chrono::Duration;
use sqlx::SqlitePool;

use crate::{
    auth::{AuthBackend, CsrfService, SessionClient},
    cache::{QueryCache, SqliteCacheStore},
    cms::ContentSource,
    config::Settings,
    error::Result,
    repository::{ContactRepository, SqliteContactRepository},
};
use contact_service::ContactService;
use content_service::ContentService;

pub use contact_service::ContactOutcome;
pub use content_service::{normalize_slug, PreviewContent, PreviewKind, HOME_SLUG};

pub struct ServiceContext {
    pub content: Arc<ContentService>,
    pub contact: Arc<ContactService>,
    pub sessions: Arc<SessionClient>,
    pub csrf: Arc<CsrfService>,
    pub cache: Arc<QueryCache>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        content_source: Arc<dyn ContentSource>,
        auth_backend: Arc<dyn AuthBackend>,
        db_pool: SqlitePool,
        settings: &Settings,
    ) -> Result<Self> {
        let cache = Arc::new(
            QueryCache::with_store(
                Duration::seconds(settings.cms.cache_ttl_secs),
                Arc::new(SqliteCacheStore::new(db_pool.clone())),
            )
            .with_max_entries(settings.cms.cache_max_entries),
        );

        let contact_repo: Arc<dyn ContactRepository> =
            Arc::new(SqliteContactRepository::new(db_pool.clone()));

        let cookie_path = settings
            .server
            .effective_base_path()
            .unwrap_or_else(|| "/".to_string());

        let content = Arc::new(ContentService::new(content_source, cache.clone()));
        let contact = Arc::new(ContactService::new(
            contact_repo,
            settings.contact.forward_url.clone(),
        )?);
        let sessions = Arc::new(SessionClient::new(
            auth_backend,
            cache.clone(),
            settings.auth.cookie_name.clone(),
            cookie_path,
        ));
        let csrf = Arc::new(CsrfService::new(&settings.security.csrf_secret));

        Ok(Self {
            content,
            contact,
            sessions,
            csrf,
            cache,
            db_pool,
        })
    }
}

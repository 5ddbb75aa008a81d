use std::sync::Arc;
use crate::{
    config::Settings,
    service::ServiceContext,
};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service_context,
            settings,
        }
    }

    /// Prefix for links and redirects: `/sub` in production when a base path
    /// is configured, otherwise empty.
    pub fn base_path(&self) -> String {
        self.settings.server.effective_base_path().unwrap_or_default()
    }

    /// Site-relative link carrying the base path.
    pub fn link(&self, path: &str) -> String {
        format!("{}{}", self.base_path(), path)
    }
}

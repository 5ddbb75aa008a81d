use askama::Template;
use chrono::{Datelike, Utc};
use axum::{
    response::{Html, IntoResponse, Response},
    http::StatusCode,
};

use crate::{
    api::state::AppState,
    domain::{Announcement, SiteInfo},
};

pub struct NavItem {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

const NAV: &[(&str, &str)] = &[
    ("Home", "/"),
    ("Events", "/events"),
    ("Vendors", "/vendors"),
    ("Sponsors", "/sponsors"),
    ("Gallery", "/gallery"),
    ("Contact", "/contact"),
];

// Shared chrome data every page template carries
pub struct LayoutContext {
    pub site: SiteInfo,
    pub title: String,
    pub base_path: String,
    pub nav: Vec<NavItem>,
    pub announcements: Vec<Announcement>,
    pub preview: bool,
    pub year: i32,
}

impl LayoutContext {
    /// Load site info and active announcements for the layout. Content
    /// failures degrade to defaults; the page still renders.
    pub async fn load(state: &AppState, current_path: &str, title: impl Into<String>) -> Self {
        let content = &state.service_context.content;
        let site = content.site_info().await;
        let announcements = content.announcements().await.unwrap_or_else(|e| {
            tracing::warn!("Announcements unavailable: {}", e);
            Vec::new()
        });

        let base_path = state.base_path();
        let nav = NAV
            .iter()
            .map(|(label, path)| NavItem {
                label,
                href: format!("{}{}", base_path, path),
                active: is_active(current_path, path),
            })
            .collect();

        Self {
            site,
            title: title.into(),
            base_path,
            nav,
            announcements,
            preview: false,
            year: Utc::now().year(),
        }
    }

    pub fn link(&self, path: &str) -> String {
        format!("{}{}", self.base_path, path)
    }

    pub fn page_title(&self) -> String {
        if self.title.is_empty() || self.title == self.site.name {
            self.site.name.clone()
        } else {
            format!("{} | {}", self.title, self.site.name)
        }
    }
}

fn is_active(current: &str, nav_path: &str) -> bool {
    if nav_path == "/" {
        current == "/" || current.starts_with("/pages/")
    } else {
        current == nav_path || current.starts_with(&format!("{}/", nav_path))
    }
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {}", err),
                ).into_response()
            }
        }
    }
}

/// Split CMS text into paragraphs on blank lines.
pub fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

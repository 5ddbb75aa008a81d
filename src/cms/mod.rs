//! Client for the external CMS web app and the static sponsor-logo feed.
//!
//! Every CMS resource is a GET against one base URL with an `action`
//! parameter, answered by a JSON envelope:
//!
//! ```text
//! GET {base}?action=page&slug=home
//! { "ok": true, "data": { "slug": "home", "title": "...", "sections": [...] } }
//! ```
//!
//! `ok: true` with `data: null` (or an HTTP 404) means the CMS has no such
//! content.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::{CmsConfig, SponsorConfig},
    domain::SponsorLogo,
    error::{AppError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Page,
    Site,
    Announcements,
    Featured,
    Events,
    Event,
    Vendors,
    Galleries,
    Gallery,
    Sponsors,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Page => "page",
            Resource::Site => "site",
            Resource::Announcements => "announcements",
            Resource::Featured => "featured",
            Resource::Events => "events",
            Resource::Event => "event",
            Resource::Vendors => "vendors",
            Resource::Galleries => "galleries",
            Resource::Gallery => "gallery",
            Resource::Sponsors => "sponsors",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CmsRequest {
    #[serde(rename = "action")]
    pub resource: Resource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CmsRequest {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            slug: None,
            preview: None,
            token: None,
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Ask the CMS for unpublished content.
    pub fn preview(mut self, token: Option<String>) -> Self {
        self.preview = Some(1);
        self.token = token;
        self
    }

    pub fn query_string(&self) -> Result<String> {
        serde_urlencoded::to_string(self)
            .map_err(|e| AppError::Internal(format!("Failed to encode CMS query: {}", e)))
    }
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a CMS resource. `Ok(None)` means the CMS has no such content.
    async fn fetch(&self, request: &CmsRequest) -> Result<Option<Value>>;

    /// Entries of the sponsor-logo feed. Empty when no feed is configured.
    async fn sponsor_logos(&self) -> Result<Vec<SponsorLogo>>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

fn default_ok() -> bool {
    true
}

pub struct HttpCmsClient {
    client: reqwest::Client,
    base_url: String,
    logo_feed_url: Option<String>,
}

impl HttpCmsClient {
    pub fn new(cms: &CmsConfig, sponsors: &SponsorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cms.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: cms.base_url.clone(),
            logo_feed_url: sponsors.logo_feed_url.clone(),
        })
    }

    fn url_for(&self, request: &CmsRequest) -> Result<String> {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", self.base_url, separator, request.query_string()?))
    }
}

#[async_trait]
impl ContentSource for HttpCmsClient {
    async fn fetch(&self, request: &CmsRequest) -> Result<Option<Value>> {
        let url = self.url_for(request)?;
        tracing::debug!("CMS request: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Cms(format!("{} request failed: {}", request.resource.as_str(), e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Cms(format!(
                "{} returned HTTP {}",
                request.resource.as_str(),
                status
            )));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| AppError::Cms(format!("{} returned malformed JSON: {}", request.resource.as_str(), e)))?;

        if !envelope.ok {
            return Err(AppError::Cms(envelope.error.unwrap_or_else(|| {
                format!("{} request was rejected", request.resource.as_str())
            })));
        }

        Ok(envelope.data.filter(|v| !v.is_null()))
    }

    async fn sponsor_logos(&self) -> Result<Vec<SponsorLogo>> {
        let Some(url) = &self.logo_feed_url else {
            return Ok(Vec::new());
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Cms(format!("Sponsor logo feed failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Cms(format!(
                "Sponsor logo feed returned HTTP {}",
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AppError::Cms(format!("Sponsor logo feed returned malformed JSON: {}", e)))?;

        Ok(decode_list(Some(value), "sponsor logo"))
    }
}

/// Decode a single CMS record.
pub fn decode_one<T: DeserializeOwned>(value: Option<Value>, what: &str) -> Result<Option<T>> {
    value
        .map(|v| {
            serde_json::from_value(v)
                .map_err(|e| AppError::Cms(format!("Malformed {}: {}", what, e)))
        })
        .transpose()
}

/// Decode a CMS list record by record, dropping rows that do not decode so
/// one bad spreadsheet row cannot blank a whole page.
pub fn decode_list<T: DeserializeOwned>(value: Option<Value>, what: &str) -> Vec<T> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Vec::new(),
        Some(other) => {
            tracing::warn!("Expected a list of {} records, got {}", what, other);
            return Vec::new();
        }
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed {} record: {}", what, e);
                None
            }
        })
        .collect()
}

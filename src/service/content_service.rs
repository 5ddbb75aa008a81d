use std::{str::FromStr, sync::Arc};

use serde::Serialize;
use serde_json::Value;

use crate::{
    cache::{self, QueryCache},
    cms::{decode_list, decode_one, CmsRequest, ContentSource, Resource},
    domain::*,
    error::{AppError, Result},
};

pub const HOME_SLUG: &str = "home";

/// Content types a CMS author can preview before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Page,
    Event,
    Gallery,
}

impl FromStr for PreviewKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "page" => Ok(PreviewKind::Page),
            "event" => Ok(PreviewKind::Event),
            "gallery" => Ok(PreviewKind::Gallery),
            other => Err(AppError::NotFound(format!("Unknown preview type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum PreviewContent {
    Page(Page),
    Event(Event),
    Gallery(GalleryAlbum),
}

/// Normalize a URL slug; an absent or blank slug is the home page.
pub fn normalize_slug(slug: Option<&str>) -> String {
    let slug = slug.unwrap_or("").trim().trim_matches('/').to_lowercase();
    if slug.is_empty() {
        HOME_SLUG.to_string()
    } else {
        slug
    }
}

/// Cached, validated access to CMS content.
pub struct ContentService {
    source: Arc<dyn ContentSource>,
    cache: Arc<QueryCache>,
}

impl ContentService {
    pub fn new(source: Arc<dyn ContentSource>, cache: Arc<QueryCache>) -> Self {
        Self { source, cache }
    }

    pub async fn page(&self, slug: &str) -> Result<Option<Page>> {
        let request = CmsRequest::new(Resource::Page).with_slug(slug);
        self.cache
            .fetch(&cache::key(&["cms", "page", slug]), || async {
                decode_one::<Page>(self.source.fetch(&request).await?, "page")
            })
            .await
    }

    /// Site name and contact details. Falls back to defaults rather than
    /// failing, since every page's layout needs it.
    pub async fn site_info(&self) -> SiteInfo {
        let request = CmsRequest::new(Resource::Site);
        let result = self
            .cache
            .fetch("cms:site", || async {
                decode_one::<SiteInfo>(self.source.fetch(&request).await?, "site info")
            })
            .await;

        match result {
            Ok(Some(info)) => info,
            Ok(None) => SiteInfo::default(),
            Err(e) => {
                tracing::warn!("Using default site info: {}", e);
                SiteInfo::default()
            }
        }
    }

    /// Active announcements only.
    pub async fn announcements(&self) -> Result<Vec<Announcement>> {
        let all: Vec<Announcement> = self.list(Resource::Announcements, "announcement").await?;
        Ok(all.into_iter().filter(|a| a.active).collect())
    }

    pub async fn featured_events(&self) -> Result<Vec<FeaturedEvent>> {
        let mut featured: Vec<FeaturedEvent> = self.list(Resource::Featured, "featured event").await?;
        featured.sort_by_key(|e| e.date);
        Ok(featured)
    }

    /// All events, soonest first.
    pub async fn events(&self) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self.list(Resource::Events, "event").await?;
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    pub async fn event(&self, key: &str) -> Result<Option<Event>> {
        Ok(self.events().await?.into_iter().find(|e| e.matches_key(key)))
    }

    pub async fn vendors(&self) -> Result<Vec<Vendor>> {
        self.list(Resource::Vendors, "vendor").await
    }

    pub async fn galleries(&self) -> Result<Vec<GalleryAlbum>> {
        self.list(Resource::Galleries, "gallery").await
    }

    pub async fn gallery(&self, slug: &str) -> Result<Option<GalleryAlbum>> {
        let request = CmsRequest::new(Resource::Gallery).with_slug(slug);
        self.cache
            .fetch(&cache::key(&["cms", "gallery", slug]), || async {
                decode_one::<GalleryAlbum>(self.source.fetch(&request).await?, "gallery")
            })
            .await
    }

    /// Sponsors that pass validation, with logos filled in from the logo
    /// feed. Invalid records (e.g. an unknown tier) are dropped.
    pub async fn sponsors(&self) -> Result<Vec<Sponsor>> {
        self.cache
            .fetch("cms:sponsors", || async {
                let raw = self.source.fetch(&CmsRequest::new(Resource::Sponsors)).await?;
                let records: Vec<SponsorRecord> = decode_list(raw, "sponsor");

                let mut sponsors: Vec<Sponsor> = records
                    .into_iter()
                    .filter_map(|record| match Sponsor::try_from(record) {
                        Ok(sponsor) => Some(sponsor),
                        Err(e) => {
                            tracing::warn!("Rejected sponsor record: {}", e);
                            None
                        }
                    })
                    .collect();

                match self.source.sponsor_logos().await {
                    Ok(logos) => merge_logos(&mut sponsors, &logos),
                    Err(e) => tracing::warn!("Sponsor logos unavailable: {}", e),
                }

                Ok(sponsors)
            })
            .await
    }

    pub async fn sponsor_groups(&self) -> Result<Vec<SponsorGroup>> {
        Ok(group_by_tier(&self.sponsors().await?))
    }

    /// Unpublished content for CMS authors. Never cached.
    pub async fn preview(
        &self,
        kind: PreviewKind,
        slug: &str,
        token: Option<String>,
    ) -> Result<Option<PreviewContent>> {
        let resource = match kind {
            PreviewKind::Page => Resource::Page,
            PreviewKind::Event => Resource::Event,
            PreviewKind::Gallery => Resource::Gallery,
        };
        let request = CmsRequest::new(resource).with_slug(slug).preview(token);
        let raw = self.source.fetch(&request).await?;

        Ok(match kind {
            PreviewKind::Page => decode_one(raw, "page")?.map(PreviewContent::Page),
            PreviewKind::Event => decode_one(raw, "event")?.map(PreviewContent::Event),
            PreviewKind::Gallery => decode_one(raw, "gallery")?.map(PreviewContent::Gallery),
        })
    }

    /// Cached content as JSON for client-side scripts.
    pub async fn resource_json(&self, resource: &str) -> Result<Value> {
        let value = match resource {
            "site" => serde_json::to_value(self.site_info().await)?,
            "announcements" => serde_json::to_value(self.announcements().await?)?,
            "featured" => serde_json::to_value(self.featured_events().await?)?,
            "events" => serde_json::to_value(self.events().await?)?,
            "vendors" => serde_json::to_value(self.vendors().await?)?,
            "galleries" => serde_json::to_value(self.galleries().await?)?,
            "sponsors" => serde_json::to_value(self.sponsors().await?)?,
            other => return Err(AppError::NotFound(format!("Unknown content resource: {}", other))),
        };
        Ok(value)
    }

    async fn list<T>(&self, resource: Resource, what: &str) -> Result<Vec<T>>
    where
        T: Serialize + serde::de::DeserializeOwned,
    {
        let request = CmsRequest::new(resource);
        self.cache
            .fetch(&cache::key(&["cms", resource.as_str()]), || async {
                Ok(decode_list::<T>(self.source.fetch(&request).await?, what))
            })
            .await
    }
}

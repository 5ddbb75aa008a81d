use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub url: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub alt: Option<String>,
}

impl GalleryImage {
    pub fn alt_text(&self) -> &str {
        self.alt
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryAlbum {
    pub slug: String,
    pub title: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub cover_url: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub images: Vec<GalleryImage>,
}

impl GalleryAlbum {
    /// Explicit cover, else the first image.
    pub fn cover(&self) -> Option<&str> {
        self.cover_url
            .as_deref()
            .or_else(|| self.images.first().map(|i| i.url.as_str()))
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "fields::id")]
    pub id: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(deserialize_with = "fields::date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "fields::flag")]
    pub featured: bool,
}

impl Event {
    /// Key used in `/events/:slug`. Falls back to the id for rows without a slug.
    pub fn detail_key(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.id)
    }

    pub fn matches_key(&self, key: &str) -> bool {
        self.detail_key() == key || self.id == key
    }

    pub fn display_date(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.date < today
    }
}

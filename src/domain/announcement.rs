use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(deserialize_with = "fields::id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "fields::flag", alias = "isActive")]
    pub active: bool,
}

/// Highlighted event shown on the home page banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedEvent {
    #[serde(deserialize_with = "fields::id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "fields::date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl FeaturedEvent {
    pub fn display_date(&self) -> String {
        self.date.format("%A, %B %-d, %Y").to_string()
    }
}

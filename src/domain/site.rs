use serde::{Deserialize, Serialize};

use super::fields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub name: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub contact_email: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub contact_phone: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub address: Option<String>,
    #[serde(default)]
    pub social: Vec<SocialLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Our Town".to_string(),
            tagline: None,
            contact_email: None,
            contact_phone: None,
            address: None,
            social: Vec::new(),
        }
    }
}

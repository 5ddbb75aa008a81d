use serde::{Deserialize, Serialize};

use super::fields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    #[serde(deserialize_with = "fields::id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorCategory {
    pub name: String,
    pub vendors: Vec<Vendor>,
}

/// Group vendors by category in first-seen order. Vendors without a category
/// land in "Other", which always sorts last.
pub fn group_by_category(vendors: &[Vendor]) -> Vec<VendorCategory> {
    let mut groups: Vec<VendorCategory> = Vec::new();
    for vendor in vendors.iter().filter(|v| !v.name.trim().is_empty()) {
        let name = vendor.category.clone().unwrap_or_else(|| "Other".to_string());
        match groups.iter_mut().find(|g| g.name.eq_ignore_ascii_case(&name)) {
            Some(group) => group.vendors.push(vendor.clone()),
            None => groups.push(VendorCategory {
                name,
                vendors: vec![vendor.clone()],
            }),
        }
    }
    groups.sort_by_key(|g| g.name == "Other");
    groups
}

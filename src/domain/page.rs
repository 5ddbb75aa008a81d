use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{fields, GalleryImage};

/// CMS page document. Sections render in list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub slug: String,
    pub title: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_sections")]
    pub sections: Vec<Section>,
}

/// Decode sections one by one. A malformed section becomes
/// [`Section::Unknown`] so the rest of the page still renders.
fn lenient_sections<'de, D>(deserializer: D) -> Result<Vec<Section>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Skipping malformed section {}: {}", index, e);
                Section::Unknown
            })
        })
        .collect())
}

/// Typed content block, tagged by `type` in the CMS payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Section {
    Hero {
        heading: String,
        #[serde(default, deserialize_with = "fields::optional_text")]
        subheading: Option<String>,
        #[serde(default, deserialize_with = "fields::optional_text")]
        image_url: Option<String>,
        #[serde(default, deserialize_with = "fields::optional_text")]
        cta_label: Option<String>,
        #[serde(default, deserialize_with = "fields::optional_text")]
        cta_href: Option<String>,
    },
    Text {
        #[serde(default, deserialize_with = "fields::optional_text")]
        heading: Option<String>,
        body: String,
    },
    Image {
        url: String,
        #[serde(default, deserialize_with = "fields::optional_text")]
        alt: Option<String>,
        #[serde(default, deserialize_with = "fields::optional_text")]
        caption: Option<String>,
    },
    Gallery {
        #[serde(default, deserialize_with = "fields::optional_text")]
        heading: Option<String>,
        #[serde(default)]
        images: Vec<GalleryImage>,
    },
    Cta {
        heading: String,
        #[serde(default, deserialize_with = "fields::optional_text")]
        body: Option<String>,
        label: String,
        href: String,
    },
    EventList {
        #[serde(default, deserialize_with = "fields::optional_text")]
        heading: Option<String>,
        #[serde(default, deserialize_with = "fields::optional_count")]
        limit: Option<usize>,
        #[serde(default, deserialize_with = "fields::flag")]
        featured_only: bool,
    },
    SponsorGrid {
        #[serde(default, deserialize_with = "fields::optional_text")]
        heading: Option<String>,
    },
    Announcements {
        #[serde(default, deserialize_with = "fields::optional_text")]
        heading: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl Page {
    pub fn needs_events(&self) -> bool {
        self.sections.iter().any(|s| matches!(s, Section::EventList { .. }))
    }

    pub fn needs_sponsors(&self) -> bool {
        self.sections.iter().any(|s| matches!(s, Section::SponsorGrid { .. }))
    }

    pub fn needs_announcements(&self) -> bool {
        self.sections.iter().any(|s| matches!(s, Section::Announcements { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sections_in_order() {
        let page: Page = serde_json::from_value(json!({
            "slug": "home",
            "title": "Welcome",
            "sections": [
                { "type": "hero", "heading": "Harvest Fest", "ctaLabel": "See events", "ctaHref": "/events" },
                { "type": "text", "body": "Join us downtown." },
                { "type": "carousel", "slides": [] },
                { "type": "event-list", "limit": "3", "featuredOnly": "yes" }
            ]
        }))
        .unwrap();

        assert_eq!(page.sections.len(), 4);
        assert!(matches!(page.sections[0], Section::Hero { .. }));
        assert!(matches!(page.sections[1], Section::Text { .. }));
        assert!(matches!(page.sections[2], Section::Unknown));
        assert!(page.needs_events());
        assert!(!page.needs_sponsors());
        match &page.sections[3] {
            Section::EventList { limit, featured_only, .. } => {
                assert_eq!(*limit, Some(3));
                assert!(*featured_only);
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn malformed_section_does_not_sink_the_page() {
        let page: Page = serde_json::from_value(json!({
            "slug": "about",
            "title": "About",
            "sections": [
                { "type": "hero", "subheading": "no heading" },
                { "type": "text", "body": "Founded in 1902." },
                { "type": "cta", "heading": "Join" },
                "not an object"
            ]
        }))
        .unwrap();

        assert_eq!(page.sections.len(), 4);
        assert!(matches!(page.sections[0], Section::Unknown));
        assert!(matches!(page.sections[1], Section::Text { .. }));
        assert!(matches!(page.sections[2], Section::Unknown));
        assert!(matches!(page.sections[3], Section::Unknown));
    }
}

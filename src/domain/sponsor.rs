use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::fields;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SponsorTier {
    Presenting,
    Gold,
    Silver,
    Supporting,
}

impl SponsorTier {
    /// Display order, highest tier first.
    pub const ALL: [SponsorTier; 4] = [
        SponsorTier::Presenting,
        SponsorTier::Gold,
        SponsorTier::Silver,
        SponsorTier::Supporting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SponsorTier::Presenting => "presenting",
            SponsorTier::Gold => "gold",
            SponsorTier::Silver => "silver",
            SponsorTier::Supporting => "supporting",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SponsorTier::Presenting => "Presenting Sponsors",
            SponsorTier::Gold => "Gold Sponsors",
            SponsorTier::Silver => "Silver Sponsors",
            SponsorTier::Supporting => "Supporting Sponsors",
        }
    }
}

impl fmt::Display for SponsorTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SponsorTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "presenting" => Ok(SponsorTier::Presenting),
            "gold" => Ok(SponsorTier::Gold),
            "silver" => Ok(SponsorTier::Silver),
            "supporting" => Ok(SponsorTier::Supporting),
            other => Err(AppError::Validation(format!("Invalid sponsor tier: {}", other))),
        }
    }
}

/// Sponsor row as it arrives from the CMS, before validation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SponsorRecord {
    #[serde(deserialize_with = "fields::id")]
    pub id: String,
    #[validate(length(min = 1, message = "Sponsor name is required"))]
    pub name: String,
    #[validate(custom(function = "validate_tier"))]
    pub tier: String,
    #[serde(default, deserialize_with = "fields::optional_text")]
    #[validate(url(message = "Logo must be a URL"))]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "fields::optional_text")]
    #[validate(url(message = "Website must be a URL"))]
    pub website: Option<String>,
}

fn validate_tier(tier: &str) -> Result<(), ValidationError> {
    tier.parse::<SponsorTier>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("tier").with_message("Unknown sponsor tier".into()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    pub id: String,
    pub name: String,
    pub tier: SponsorTier,
    pub logo_url: Option<String>,
    pub website: Option<String>,
}

impl TryFrom<SponsorRecord> for Sponsor {
    type Error = AppError;

    fn try_from(record: SponsorRecord) -> Result<Self, Self::Error> {
        record
            .validate()
            .map_err(|e| AppError::Validation(format!("Sponsor {}: {}", record.id, e)))?;

        Ok(Sponsor {
            tier: record.tier.parse()?,
            id: record.id,
            name: record.name.trim().to_string(),
            logo_url: record.logo_url,
            website: record.website,
        })
    }
}

/// Entry from the static sponsor-logo feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorLogo {
    pub name: String,
    pub logo_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SponsorGroup {
    pub tier: SponsorTier,
    pub sponsors: Vec<Sponsor>,
}

/// Fill missing logos from the logo feed, matching on a case-insensitive name.
pub fn merge_logos(sponsors: &mut [Sponsor], logos: &[SponsorLogo]) {
    for sponsor in sponsors.iter_mut().filter(|s| s.logo_url.is_none()) {
        let name = sponsor.name.to_lowercase();
        if let Some(logo) = logos.iter().find(|l| l.name.trim().to_lowercase() == name) {
            sponsor.logo_url = Some(logo.logo_url.clone());
        }
    }
}

/// Group sponsors by tier in display order, keeping CMS order within a tier.
/// Tiers without sponsors are omitted.
pub fn group_by_tier(sponsors: &[Sponsor]) -> Vec<SponsorGroup> {
    SponsorTier::ALL
        .iter()
        .map(|tier| SponsorGroup {
            tier: *tier,
            sponsors: sponsors.iter().filter(|s| s.tier == *tier).cloned().collect(),
        })
        .filter(|g| !g.sponsors.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(tier: &str) -> SponsorRecord {
        serde_json::from_value(json!({
            "id": 1,
            "name": "Main Street Bakery",
            "tier": tier,
            "logoUrl": "",
            "website": "https://bakery.example.com"
        }))
        .unwrap()
    }

    #[test]
    fn accepts_known_tiers() {
        for tier in ["presenting", "gold", "silver", "supporting"] {
            let sponsor = Sponsor::try_from(record(tier)).unwrap();
            assert_eq!(sponsor.logo_url, None);
        }
    }

    #[test]
    fn rejects_unknown_tiers() {
        for tier in ["platinum", "", "bronze", "Gold", "GOLD", "gold "] {
            assert!(matches!(
                Sponsor::try_from(record(tier)),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn rejects_malformed_website() {
        let mut rec = record("gold");
        rec.website = Some("not a url".to_string());
        assert!(Sponsor::try_from(rec).is_err());
    }

    #[test]
    fn groups_in_tier_order() {
        let make = |id: &str, tier| Sponsor {
            id: id.to_string(),
            name: id.to_string(),
            tier,
            logo_url: None,
            website: None,
        };
        let sponsors = vec![
            make("a", SponsorTier::Supporting),
            make("b", SponsorTier::Presenting),
            make("c", SponsorTier::Supporting),
        ];

        let groups = group_by_tier(&sponsors);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].tier, SponsorTier::Presenting);
        assert_eq!(groups[1].sponsors.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn merges_logos_by_name() {
        let mut sponsors = vec![Sponsor {
            id: "1".into(),
            name: "Main Street Bakery".into(),
            tier: SponsorTier::Gold,
            logo_url: None,
            website: None,
        }];
        let logos = vec![SponsorLogo {
            name: "main street bakery".into(),
            logo_url: "https://cdn.example.com/bakery.png".into(),
        }];

        merge_logos(&mut sponsors, &logos);
        assert_eq!(sponsors[0].logo_url.as_deref(), Some("https://cdn.example.com/bakery.png"));
    }
}

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

use crate::domain::SponsorTier;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cms: CmsConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub sponsors: SponsorConfig,
    #[serde(default)]
    pub forms: FormsConfig,
    #[serde(default)]
    pub contact: ContactConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    /// Sub-path the site is hosted under. Only applied in production.
    #[serde(default)]
    pub base_path: String,
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CmsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_ttl_secs: i64,
    pub cache_max_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub base_url: String,
    pub cookie_name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SponsorConfig {
    pub logo_feed_url: Option<String>,
    pub presenting_signup_url: Option<String>,
    pub gold_signup_url: Option<String>,
    pub silver_signup_url: Option<String>,
    pub supporting_signup_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FormsConfig {
    pub vendor_signup_url: Option<String>,
    pub volunteer_signup_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContactConfig {
    pub forward_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    pub csrf_secret: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("server.base_path", "")?
            .set_default("server.environment", "development")?
            .set_default("database.url", "sqlite://townhall.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("cms.base_url", "http://localhost:9000/cms")?
            .set_default("cms.timeout_secs", 10)?
            .set_default("cms.cache_ttl_secs", 600)?
            .set_default("cms.cache_max_entries", 1024)?
            .set_default("auth.base_url", "http://localhost:9000")?
            .set_default("auth.cookie_name", "connect.sid")?
            .set_default("security.csrf_secret", "change-me-in-production")?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with TOWNHALL__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TOWNHALL").separator("__"))

            .build()?;

        config.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Square/Google Form link for a sponsorship tier, if one is configured.
    pub fn sponsor_signup_url(&self, tier: SponsorTier) -> Option<&str> {
        let url = match tier {
            SponsorTier::Presenting => &self.sponsors.presenting_signup_url,
            SponsorTier::Gold => &self.sponsors.gold_signup_url,
            SponsorTier::Silver => &self.sponsors.silver_signup_url,
            SponsorTier::Supporting => &self.sponsors.supporting_signup_url,
        };
        url.as_deref()
    }
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// The normalized path prefix (`/sub`), or `None` outside production or
    /// when no prefix is configured.
    pub fn effective_base_path(&self) -> Option<String> {
        if !self.is_production() {
            return None;
        }
        let trimmed = self.base_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{}", trimmed))
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
                base_path: String::new(),
                environment: "development".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://townhall.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            cms: CmsConfig {
                base_url: "http://localhost:9000/cms".to_string(),
                timeout_secs: 10,
                cache_ttl_secs: 600,
                cache_max_entries: 1024,
            },
            auth: AuthConfig {
                base_url: "http://localhost:9000".to_string(),
                cookie_name: "connect.sid".to_string(),
            },
            sponsors: SponsorConfig::default(),
            forms: FormsConfig::default(),
            contact: ContactConfig::default(),
            security: SecurityConfig {
                csrf_secret: "change-me-in-production".to_string(),
            },
        }
    }
}

use std::time::Duration;

use async_trait::async_trait;
use cookie::{Cookie, SameSite};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::AuthConfig,
    domain::fields,
    error::{AppError, Result},
};

pub mod csrf;
pub mod session;

pub use csrf::CsrfService;
pub use session::{AuthStatus, LoginOutcome, SessionClient};

/// Identity returned by the auth service's `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(deserialize_with = "fields::id")]
    pub id: String,
    pub username: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw answer from the auth service.
#[derive(Debug, Clone, Default)]
pub struct AuthReply {
    pub status: u16,
    pub body: Option<Value>,
    pub set_cookies: Vec<String>,
}

impl AuthReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The external authentication service. `cookie` is the session cookie value
/// the browser presented.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn me(&self, cookie: &str) -> Result<AuthReply>;
    async fn login(&self, credentials: &Credentials) -> Result<AuthReply>;
    async fn logout(&self, cookie: &str) -> Result<AuthReply>;
}

pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: String,
    cookie_name: String,
}

impl HttpAuthBackend {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie_name: config.cookie_name.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `cookie` arrives percent-decoded from the browser's jar; re-encode it
    /// the way the auth service issued it.
    fn cookie_header(&self, cookie: &str) -> String {
        Cookie::new(self.cookie_name.clone(), cookie.to_string())
            .encoded()
            .to_string()
    }

    async fn into_reply(response: reqwest::Response) -> AuthReply {
        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();
        let body = response.json::<Value>().await.ok();

        AuthReply {
            status,
            body,
            set_cookies,
        }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn me(&self, cookie: &str) -> Result<AuthReply> {
        let response = self
            .client
            .get(self.url("/api/auth/me"))
            .header(COOKIE, self.cookie_header(cookie))
            .send()
            .await?;

        Ok(Self::into_reply(response).await)
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthReply> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(credentials)
            .send()
            .await?;

        Ok(Self::into_reply(response).await)
    }

    async fn logout(&self, cookie: &str) -> Result<AuthReply> {
        let response = self
            .client
            .post(self.url("/api/auth/logout"))
            .header(COOKIE, self.cookie_header(cookie))
            .send()
            .await?;

        Ok(Self::into_reply(response).await)
    }
}

/// Re-issue an auth-service `Set-Cookie` for this site: the domain is dropped
/// and the path pinned to the site's base path. The value is held decoded;
/// the response jar encodes it again.
pub fn relay_cookie(raw: &str, path: &str) -> Option<Cookie<'static>> {
    let parsed = Cookie::parse_encoded(raw.to_string()).ok()?;

    let mut builder = Cookie::build((parsed.name().to_string(), parsed.value().to_string()))
        .path(path.to_string())
        .http_only(true)
        .same_site(parsed.same_site().unwrap_or(SameSite::Lax));

    if let Some(secure) = parsed.secure() {
        builder = builder.secure(secure);
    }
    if let Some(max_age) = parsed.max_age() {
        builder = builder.max_age(max_age);
    }
    if let Some(expires) = parsed.expires_datetime() {
        builder = builder.expires(expires);
    }

    Some(builder.build())
}

/// Cookie that clears the session in the browser.
pub fn logout_cookie(name: &str, path: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path(path.to_string())
        .same_site(SameSite::Lax)
        .http_only(true)
        .max_age(cookie::time::Duration::seconds(0))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relayed_cookie_drops_domain_and_pins_path() {
        let cookie = relay_cookie(
            "connect.sid=s%3Aabc; Domain=auth.example.org; Path=/api; HttpOnly; Max-Age=3600",
            "/festival",
        )
        .unwrap();

        assert_eq!(cookie.name(), "connect.sid");
        assert_eq!(cookie.value(), "s:abc");
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.path(), Some("/festival"));
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::hours(1)));
    }

    #[test]
    fn session_cookie_is_forwarded_encoded() {
        let backend = HttpAuthBackend::new(&AuthConfig {
            base_url: "http://auth.test/".to_string(),
            cookie_name: "connect.sid".to_string(),
        })
        .unwrap();

        assert_eq!(backend.url("/api/auth/me"), "http://auth.test/api/auth/me");
        let header = backend.cookie_header("s:abc def");
        assert!(!header.contains(' '));
        let parsed = Cookie::parse_encoded(header).unwrap();
        assert_eq!(parsed.name(), "connect.sid");
        assert_eq!(parsed.value(), "s:abc def");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            username: "admin".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}

use std::sync::Arc;

use cookie::Cookie;
use serde::Serialize;

use crate::{
    auth::{logout_cookie, relay_cookie, AuthBackend, Credentials, CurrentUser},
    cache::{self, QueryCache},
    error::{AppError, Result},
};

const ME_PREFIX: &str = "auth:me:";

/// Authentication state for one browser session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthStatus {
    pub user: Option<CurrentUser>,
    pub is_authenticated: bool,
}

impl From<Option<CurrentUser>> for AuthStatus {
    fn from(user: Option<CurrentUser>) -> Self {
        Self {
            is_authenticated: user.is_some(),
            user,
        }
    }
}

#[derive(Debug)]
pub struct LoginOutcome {
    pub user: Option<CurrentUser>,
    /// Cookies to hand to the browser.
    pub cookies: Vec<Cookie<'static>>,
    /// The new session cookie value, when the auth service issued one.
    pub session_token: Option<String>,
}

/// "Who am I", login and logout against the auth service, with the current
/// user cached per session cookie.
pub struct SessionClient {
    backend: Arc<dyn AuthBackend>,
    cache: Arc<QueryCache>,
    cookie_name: String,
    cookie_path: String,
}

impl SessionClient {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        cache: Arc<QueryCache>,
        cookie_name: impl Into<String>,
        cookie_path: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            cache,
            cookie_name: cookie_name.into(),
            cookie_path: cookie_path.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// The signed-in user, or `None`. A missing cookie, a 401 or any other
    /// client-error status means "no session" and is cached like any answer.
    /// A transport failure or a 5xx is not an answer: it also yields `None`,
    /// but nothing is cached, so the next request asks again.
    pub async fn current_user(&self, session_token: Option<&str>) -> Option<CurrentUser> {
        let token = session_token.filter(|t| !t.is_empty())?;
        let key = Self::me_key(token);

        let lookup = self
            .cache
            .fetch_unpersisted(&key, || self.fetch_me(token))
            .await;

        match lookup {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Session check failed: {}", e);
                None
            }
        }
    }

    pub async fn status(&self, session_token: Option<&str>) -> AuthStatus {
        self.current_user(session_token).await.into()
    }

    async fn fetch_me(&self, token: &str) -> Result<Option<CurrentUser>> {
        let reply = self.backend.me(token).await?;

        if reply.status >= 500 {
            return Err(AppError::External(format!(
                "Auth service returned HTTP {} for session check",
                reply.status
            )));
        }
        if !reply.is_success() {
            tracing::debug!("Session check returned HTTP {}", reply.status);
            return Ok(None);
        }

        Ok(reply
            .body
            .and_then(|body| serde_json::from_value::<CurrentUser>(body).ok()))
    }

    /// Sign in. Invalid credentials reject with [`AppError::Unauthorized`].
    /// On success every cached current-user entry is dropped so the next
    /// check goes back to the auth service.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let reply = self.backend.login(credentials).await?;

        match reply.status {
            200..=299 => {}
            400 | 401 | 403 | 422 => {
                tracing::info!("Login rejected for {}", credentials.username);
                return Err(AppError::Unauthorized);
            }
            status => {
                return Err(AppError::External(format!(
                    "Auth service returned HTTP {} for login",
                    status
                )));
            }
        }

        let cookies: Vec<Cookie<'static>> = reply
            .set_cookies
            .iter()
            .filter_map(|raw| relay_cookie(raw, &self.cookie_path))
            .collect();
        let session_token = cookies
            .iter()
            .find(|c| c.name() == self.cookie_name)
            .map(|c| c.value().to_string());
        let user = reply
            .body
            .and_then(|body| serde_json::from_value::<CurrentUser>(body).ok());

        self.cache.invalidate_prefix(ME_PREFIX).await;
        tracing::info!("User {} signed in", credentials.username);

        Ok(LoginOutcome {
            user,
            cookies,
            session_token,
        })
    }

    /// Sign out. The browser cookie is always cleared, even when the auth
    /// service cannot be reached.
    pub async fn logout(&self, session_token: Option<&str>) -> Cookie<'static> {
        if let Some(token) = session_token.filter(|t| !t.is_empty()) {
            match self.backend.logout(token).await {
                Ok(reply) if !reply.is_success() => {
                    tracing::warn!("Auth service returned HTTP {} for logout", reply.status);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Logout request failed: {}", e),
            }
            self.cache.invalidate(&Self::me_key(token)).await;
        }

        logout_cookie(&self.cookie_name, &self.cookie_path)
    }

    fn me_key(token: &str) -> String {
        format!("{}{}", ME_PREFIX, cache::hashed(token))
    }
}

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::ServiceExt;

use townhall::{
    auth::{AuthBackend, AuthReply, Credentials},
    build_router,
    cms::{CmsRequest, ContentSource},
    config::Settings,
    domain::SponsorLogo,
    error::{AppError, Result},
    service::ServiceContext,
};

pub const SESSION_COOKIE: &str = "connect.sid";
pub const VALID_SESSION: &str = "valid-session-1";

/// In-memory CMS keyed by `action` or `action:slug`.
#[derive(Default)]
pub struct FakeCms {
    content: Mutex<HashMap<String, Value>>,
    logos: Vec<SponsorLogo>,
    pub failing: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeCms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, value: Value) -> Self {
        self.content.lock().unwrap().insert(key.to_string(), value);
        self
    }

    pub fn with_logos(mut self, logos: Vec<SponsorLogo>) -> Self {
        self.logos = logos;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FakeCms {
    async fn fetch(&self, request: &CmsRequest) -> Result<Option<Value>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Cms("CMS unreachable".to_string()));
        }

        let key = match &request.slug {
            Some(slug) => format!("{}:{}", request.resource.as_str(), slug),
            None => request.resource.as_str().to_string(),
        };
        Ok(self.content.lock().unwrap().get(&key).cloned())
    }

    async fn sponsor_logos(&self) -> Result<Vec<SponsorLogo>> {
        Ok(self.logos.clone())
    }
}

/// Auth service that knows one user, `admin` / `secret`. While `revoked`
/// is set every session is rejected until the next successful login.
#[derive(Default)]
pub struct FakeAuth {
    pub me_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub revoked: AtomicBool,
}

impl FakeAuth {
    pub fn me_count(&self) -> usize {
        self.me_calls.load(Ordering::SeqCst)
    }

    pub fn revoke_sessions(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn me(&self, cookie: &str) -> Result<AuthReply> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        if cookie == VALID_SESSION && !self.revoked.load(Ordering::SeqCst) {
            Ok(AuthReply {
                status: 200,
                body: Some(json!({ "id": 1, "username": "admin" })),
                set_cookies: Vec::new(),
            })
        } else {
            Ok(AuthReply {
                status: 401,
                body: Some(json!({ "message": "Not authenticated" })),
                set_cookies: Vec::new(),
            })
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthReply> {
        if credentials.username == "admin" && credentials.password == "secret" {
            self.revoked.store(false, Ordering::SeqCst);
            Ok(AuthReply {
                status: 200,
                body: Some(json!({ "id": 1, "username": "admin" })),
                set_cookies: vec![format!(
                    "{}={}; Path=/; HttpOnly; Domain=auth.example.org",
                    SESSION_COOKIE, VALID_SESSION
                )],
            })
        } else {
            Ok(AuthReply {
                status: 401,
                body: Some(json!({ "message": "Invalid credentials" })),
                set_cookies: Vec::new(),
            })
        }
    }

    async fn logout(&self, _cookie: &str) -> Result<AuthReply> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AuthReply {
            status: 200,
            body: None,
            set_cookies: Vec::new(),
        })
    }
}

/// Single connection, so every query sees the same in-memory database.
pub async fn memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub struct TestApp {
    pub router: Router,
    pub context: Arc<ServiceContext>,
    pub cms: Arc<FakeCms>,
    pub auth: Arc<FakeAuth>,
}

impl TestApp {
    pub async fn new(cms: FakeCms) -> anyhow::Result<Self> {
        Self::with_settings(cms, Settings::default()).await
    }

    pub async fn with_settings(cms: FakeCms, settings: Settings) -> anyhow::Result<Self> {
        let cms = Arc::new(cms);
        let auth = Arc::new(FakeAuth::default());
        let pool = memory_pool().await?;

        let context = Arc::new(ServiceContext::new(
            cms.clone(),
            auth.clone(),
            pool,
            &settings,
        )?);
        let router = build_router(context.clone(), Arc::new(settings));

        Ok(Self {
            router,
            context,
            cms,
            auth,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn home_page() -> Value {
    json!({
        "slug": "home",
        "title": "Welcome",
        "sections": [
            { "type": "hero", "heading": "Harbor Days Festival", "ctaLabel": "See events", "ctaHref": "/events" },
            { "type": "carousel", "slides": [] },
            { "type": "text", "heading": "About the Festival", "body": "Three days on the waterfront.\n\nFree admission." },
            { "type": "cta", "heading": "Volunteer With Us", "label": "Sign up", "href": "/contact" }
        ]
    })
}

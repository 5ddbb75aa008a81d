mod common;

use axum::{body::Body, http::{header, Request, StatusCode}};
use serde_json::json;

use common::{body_text, home_page, FakeCms, TestApp};
use townhall::config::Settings;

#[tokio::test]
async fn home_renders_sections_in_cms_order() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new().with("page:home", home_page())).await?;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    let hero = html.find("Harbor Days Festival").expect("hero rendered");
    let text = html.find("About the Festival").expect("text rendered");
    let cta = html.find("Volunteer With Us").expect("cta rendered");
    assert!(hero < text && text < cta);
    assert!(html.contains("Free admission."));
    // Unknown section types are skipped
    assert!(!html.contains("carousel"));

    Ok(())
}

#[tokio::test]
async fn unknown_slug_renders_not_found() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new().with("page:home", home_page())).await?;

    let response = app.get("/pages/no-such-page").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));

    let response = app.get("/definitely/not/a/route").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn cms_outage_without_cache_is_not_found() -> anyhow::Result<()> {
    let cms = FakeCms::new().with("page:about", json!({ "slug": "about", "title": "About" }));
    cms.set_failing(true);
    let app = TestApp::new(cms).await?;

    let response = app.get("/pages/about").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn cached_page_survives_cms_outage() -> anyhow::Result<()> {
    let app = TestApp::new(
        FakeCms::new().with(
            "page:about",
            json!({
                "slug": "about",
                "title": "About Us",
                "sections": [{ "type": "text", "body": "Founded in 1902." }]
            }),
        ),
    )
    .await?;

    assert_eq!(app.get("/pages/about").await.status(), StatusCode::OK);
    let calls = app.cms.call_count();

    // Within the TTL the page is served without asking the CMS again
    app.cms.set_failing(true);
    let response = app.get("/pages/about").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Founded in 1902."));
    assert_eq!(app.cms.call_count(), calls);

    Ok(())
}

#[tokio::test]
async fn malformed_section_keeps_the_page() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new().with(
        "page:about",
        json!({
            "slug": "about",
            "title": "About Us",
            "sections": [
                { "type": "text", "body": "Founded in 1902." },
                { "type": "event-list", "limit": "3" },
                { "type": "hero", "subheading": "Missing its heading" }
            ]
        }),
    ))
    .await?;

    let response = app.get("/pages/about").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Founded in 1902."));
    assert!(html.contains("Upcoming Events"));
    assert!(!html.contains("Missing its heading"));

    Ok(())
}

#[tokio::test]
async fn unknown_slugs_do_not_accumulate() -> anyhow::Result<()> {
    let mut settings = Settings::default();
    settings.cms.cache_max_entries = 16;
    let app = TestApp::with_settings(FakeCms::new().with("page:home", home_page()), settings).await?;

    for n in 0..60 {
        let response = app.get(&format!("/pages/junk-{}", n)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
    assert!(app.context.cache.stats().await.entries <= 16);

    let persisted: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM query_cache WHERE key LIKE 'cms:page:%'")
            .fetch_one(&app.context.db_pool)
            .await?;
    assert_eq!(persisted, 0);

    // Real pages are still persisted
    assert_eq!(app.get("/").await.status(), StatusCode::OK);
    let persisted: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM query_cache WHERE key LIKE 'cms:page:%'")
            .fetch_one(&app.context.db_pool)
            .await?;
    assert_eq!(persisted, 1);

    Ok(())
}

#[tokio::test]
async fn events_split_upcoming_and_past() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new().with(
        "events",
        json!([
            { "id": 1, "slug": "lantern-walk", "title": "Lantern Walk", "date": "2099-10-31" },
            { "id": 2, "title": "Founders Picnic", "date": "2001-06-01" },
            { "id": 3, "title": "Broken Row", "date": "not a date" }
        ]),
    ))
    .await?;

    let html = body_text(app.get("/events").await).await;
    let upcoming = html.find("Lantern Walk").expect("upcoming event listed");
    let past = html.find("Founders Picnic").expect("past event listed");
    assert!(upcoming < past);
    assert!(!html.contains("Broken Row"));

    let response = app.get("/events/lantern-walk").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Lantern Walk"));

    // Events without a slug are addressed by id
    assert_eq!(app.get("/events/2").await.status(), StatusCode::OK);
    assert_eq!(app.get("/events/nope").await.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn sponsors_with_unknown_tier_are_dropped() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new().with(
        "sponsors",
        json!([
            { "id": "s1", "name": "Harbor Hardware", "tier": "gold" },
            { "id": "s2", "name": "Mystery Corp", "tier": "platinum" },
            { "id": "s3", "name": "Corner Bakery", "tier": "supporting" },
            { "id": "s4", "name": "Shouting Sails", "tier": "SILVER" }
        ]),
    ))
    .await?;

    let response = app.get("/sponsors").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Harbor Hardware"));
    assert!(html.contains("Corner Bakery"));
    assert!(!html.contains("Mystery Corp"));
    assert!(!html.contains("Shouting Sails"));

    Ok(())
}

#[tokio::test]
async fn preview_bypasses_cache_and_marks_page() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new().with(
        "page:draft",
        json!({ "slug": "draft", "title": "Draft Page", "sections": [{ "type": "text", "body": "Coming soon." }] }),
    ))
    .await?;

    let response = app.get("/preview/page?slug=draft&token=abc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Coming soon."));
    assert!(html.contains("preview-banner"));

    let before = app.cms.call_count();
    app.get("/preview/page?slug=draft").await;
    assert!(app.cms.call_count() > before);

    assert_eq!(app.get("/preview/sponsor?slug=x").await.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn base_path_applies_only_in_production() -> anyhow::Result<()> {
    let mut production = Settings::default();
    production.server.environment = "production".to_string();
    production.server.base_path = "/harbor-days".to_string();

    let app = TestApp::with_settings(FakeCms::new().with("page:home", home_page()), production).await?;
    let response = app.get("/harbor-days").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("harbor-days"));
    assert_eq!(app.get("/harbor-days/health").await.status(), StatusCode::OK);

    // Paths outside the base path still get the site's not-found view
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));

    let mut development = Settings::default();
    development.server.base_path = "/harbor-days".to_string();

    let app = TestApp::with_settings(FakeCms::new().with("page:home", home_page()), development).await?;
    assert_eq!(app.get("/").await.status(), StatusCode::OK);
    assert_eq!(app.get("/health").await.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn content_api_serves_cached_json() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new().with(
        "vendors",
        json!([{ "id": 4, "name": "Kettle Corn Co", "category": "Food" }]),
    ))
    .await?;

    let response = app
        .send(
            Request::get("/api/content/vendors")
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())?,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await)?;
    assert_eq!(body[0]["name"], "Kettle Corn Co");

    assert_eq!(app.get("/api/content/secrets").await.status(), StatusCode::NOT_FOUND);

    Ok(())
}

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

use common::{body_text, memory_pool, FakeCms, TestApp};
use townhall::{
    domain::ContactForm,
    repository::{ContactRepository, SqliteContactRepository},
    service::{contact_service::ContactService, ContactOutcome},
};

fn valid_form() -> ContactForm {
    ContactForm {
        name: "Jordan Reyes".to_string(),
        email: "jordan@example.com".to_string(),
        subject: "Booth power".to_string(),
        message: "Is there power at the craft booths?".to_string(),
    }
}

fn post_contact(fields: &[(&str, &str)]) -> anyhow::Result<Request<Body>> {
    Ok(Request::post("/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields)?))?)
}

#[tokio::test]
async fn test_contact_repository() -> anyhow::Result<()> {
    let pool = memory_pool().await?;
    let repo = SqliteContactRepository::new(pool);

    let submission = repo.create(&valid_form()).await?;
    assert_eq!(submission.email, "jordan@example.com");
    assert!(!submission.forwarded);

    repo.mark_forwarded(submission.id).await?;
    repo.create(&ContactForm {
        subject: "Parking".to_string(),
        ..valid_form()
    })
    .await?;

    assert_eq!(repo.count().await?, 2);
    let recent = repo.list_recent(10).await?;
    assert_eq!(recent.len(), 2);
    let first = recent.iter().find(|s| s.id == submission.id).expect("stored");
    assert!(first.forwarded);

    assert_eq!(repo.list_recent(1).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn service_rejects_invalid_email_without_storing() -> anyhow::Result<()> {
    let repo = Arc::new(SqliteContactRepository::new(memory_pool().await?));
    let service = ContactService::new(repo.clone(), None)?;

    let outcome = service
        .submit(&ContactForm {
            email: "not-an-email".to_string(),
            ..valid_form()
        })
        .await?;
    match outcome {
        ContactOutcome::Invalid(errors) => {
            assert_eq!(
                errors.get("email").map(String::as_str),
                Some("Please enter a valid email address")
            );
            assert!(!errors.contains_key("name"));
        }
        other => panic!("expected invalid outcome, got {:?}", other),
    }
    assert_eq!(repo.count().await?, 0);

    // Whitespace-only fields count as empty
    let outcome = service
        .submit(&ContactForm {
            name: "   ".to_string(),
            ..valid_form()
        })
        .await?;
    assert!(matches!(outcome, ContactOutcome::Invalid(ref e) if e.contains_key("name")));

    Ok(())
}

#[tokio::test]
async fn unreachable_forward_target_still_stores() -> anyhow::Result<()> {
    let repo = Arc::new(SqliteContactRepository::new(memory_pool().await?));
    let service = ContactService::new(repo.clone(), Some("http://127.0.0.1:9/forms".to_string()))?;

    match service.submit(&valid_form()).await? {
        ContactOutcome::Accepted(submission) => assert!(!submission.forwarded),
        other => panic!("expected accepted outcome, got {:?}", other),
    }
    assert_eq!(repo.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn contact_page_rejects_bad_email_inline() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new()).await?;
    let token = app.context.csrf.generate_token();

    let response = app
        .send(post_contact(&[
            ("csrf_token", token.as_str()),
            ("name", "Jordan Reyes"),
            ("email", "jordan-at-example"),
            ("subject", "Booth power"),
            ("message", "Is there power?"),
        ])?)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Please enter a valid email address"));
    // The visitor's input is kept
    assert!(html.contains("Jordan Reyes"));
    assert_eq!(app.context.contact.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn contact_page_accepts_valid_submission() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new()).await?;

    let response = app.get("/contact").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("csrf_token"));

    let token = app.context.csrf.generate_token();
    let response = app
        .send(post_contact(&[
            ("csrf_token", token.as_str()),
            ("name", "Jordan Reyes"),
            ("email", "jordan@example.com"),
            ("subject", "Booth power"),
            ("message", "Is there power?"),
        ])?)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Your message has been sent"));
    assert_eq!(app.context.contact.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn contact_page_requires_csrf_token() -> anyhow::Result<()> {
    let app = TestApp::new(FakeCms::new()).await?;

    let response = app
        .send(post_contact(&[
            ("csrf_token", "forged"),
            ("name", "Jordan Reyes"),
            ("email", "jordan@example.com"),
            ("subject", "Booth power"),
            ("message", "Is there power?"),
        ])?)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.context.contact.count().await?, 0);

    Ok(())
}

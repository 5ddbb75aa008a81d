use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    api::state::AppState,
    domain::Event,
    web::{
        pages::not_found,
        templates::{paragraphs, HtmlTemplate, LayoutContext},
    },
};

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsTemplate {
    pub layout: LayoutContext,
    pub upcoming: Vec<Event>,
    pub past: Vec<Event>,
    pub unavailable: bool,
    pub volunteer_signup_url: Option<String>,
}

#[derive(Template)]
#[template(path = "event_detail.html")]
pub struct EventDetailTemplate {
    pub layout: LayoutContext,
    pub event: Event,
    pub paragraphs: Vec<String>,
    pub is_past: bool,
}

// GET /events
pub async fn events_page(State(state): State<AppState>) -> Response {
    let today = Utc::now().date_naive();

    let (events, unavailable) = match state.service_context.content.events().await {
        Ok(events) => (events, false),
        Err(e) => {
            tracing::warn!("Events unavailable: {}", e);
            (Vec::new(), true)
        }
    };
    let (past, upcoming): (Vec<Event>, Vec<Event>) =
        events.into_iter().partition(|e| e.is_past(today));
    // Most recent past events first
    let past = past.into_iter().rev().collect();

    let layout = LayoutContext::load(&state, "/events", "Events").await;

    HtmlTemplate(EventsTemplate {
        layout,
        upcoming,
        past,
        unavailable,
        volunteer_signup_url: state.settings.forms.volunteer_signup_url.clone(),
    })
    .into_response()
}

// GET /events/:slug
pub async fn event_detail_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Response {
    let current_path = format!("/events/{}", slug);

    let event = match state.service_context.content.event(&slug).await {
        Ok(Some(event)) => event,
        Ok(None) => return not_found::render(&state, &current_path).await,
        Err(e) => {
            tracing::warn!("Failed to load event {}: {}", slug, e);
            return not_found::render(&state, &current_path).await;
        }
    };

    render_event(&state, &current_path, event, false).await
}

pub async fn render_event(state: &AppState, current_path: &str, event: Event, preview: bool) -> Response {
    let mut layout = LayoutContext::load(state, current_path, event.title.clone()).await;
    layout.preview = preview;

    HtmlTemplate(EventDetailTemplate {
        layout,
        paragraphs: event.description.as_deref().map(paragraphs).unwrap_or_default(),
        is_past: event.is_past(Utc::now().date_naive()),
        event,
    })
    .into_response()
}

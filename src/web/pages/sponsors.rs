use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    api::state::AppState,
    domain::{SponsorGroup, SponsorTier},
    web::templates::{HtmlTemplate, LayoutContext},
};

pub struct TierSignup {
    pub label: &'static str,
    pub url: String,
}

#[derive(Template)]
#[template(path = "sponsors.html")]
pub struct SponsorsTemplate {
    pub layout: LayoutContext,
    pub groups: Vec<SponsorGroup>,
    pub signups: Vec<TierSignup>,
    pub unavailable: bool,
}

// GET /sponsors
pub async fn sponsors_page(State(state): State<AppState>) -> Response {
    let (groups, unavailable) = match state.service_context.content.sponsor_groups().await {
        Ok(groups) => (groups, false),
        Err(e) => {
            tracing::warn!("Sponsors unavailable: {}", e);
            (Vec::new(), true)
        }
    };

    // Each tier routes to its own payment/signup link
    let signups = SponsorTier::ALL
        .iter()
        .filter_map(|tier| {
            state.settings.sponsor_signup_url(*tier).map(|url| TierSignup {
                label: tier.label(),
                url: url.to_string(),
            })
        })
        .collect();

    let layout = LayoutContext::load(&state, "/sponsors", "Sponsors").await;

    HtmlTemplate(SponsorsTemplate {
        layout,
        groups,
        signups,
        unavailable,
    })
    .into_response()
}

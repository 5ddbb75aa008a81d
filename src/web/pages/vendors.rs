use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    api::state::AppState,
    domain::{group_by_category, VendorCategory},
    web::templates::{HtmlTemplate, LayoutContext},
};

#[derive(Template)]
#[template(path = "vendors.html")]
pub struct VendorsTemplate {
    pub layout: LayoutContext,
    pub categories: Vec<VendorCategory>,
    pub signup_url: Option<String>,
    pub unavailable: bool,
}

// GET /vendors
pub async fn vendors_page(State(state): State<AppState>) -> Response {
    let (categories, unavailable) = match state.service_context.content.vendors().await {
        Ok(vendors) => (group_by_category(&vendors), false),
        Err(e) => {
            tracing::warn!("Vendors unavailable: {}", e);
            (Vec::new(), true)
        }
    };

    let layout = LayoutContext::load(&state, "/vendors", "Vendors").await;

    HtmlTemplate(VendorsTemplate {
        layout,
        categories,
        signup_url: state.settings.forms.vendor_signup_url.clone(),
        unavailable,
    })
    .into_response()
}

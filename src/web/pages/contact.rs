use std::collections::BTreeMap;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::{
    api::state::AppState,
    domain::ContactForm,
    service::ContactOutcome,
    web::templates::{HtmlTemplate, LayoutContext},
};

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: LayoutContext,
    pub csrf_token: String,
    pub form: ContactForm,
    pub errors: BTreeMap<String, String>,
    pub form_error: Option<String>,
    pub sent: bool,
}

impl ContactTemplate {
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactSubmit {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactSubmit {
    fn form(&self) -> ContactForm {
        ContactForm {
            name: self.name.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            message: self.message.clone(),
        }
    }
}

async fn render(
    state: &AppState,
    status: StatusCode,
    form: ContactForm,
    errors: BTreeMap<String, String>,
    form_error: Option<String>,
    sent: bool,
) -> Response {
    let layout = LayoutContext::load(state, "/contact", "Contact").await;
    let template = ContactTemplate {
        layout,
        csrf_token: state.service_context.csrf.generate_token(),
        form,
        errors,
        form_error,
        sent,
    };
    (status, HtmlTemplate(template)).into_response()
}

// GET /contact
pub async fn contact_page(State(state): State<AppState>) -> Response {
    render(&state, StatusCode::OK, ContactForm::default(), BTreeMap::new(), None, false).await
}

// POST /contact
pub async fn contact_submit(
    State(state): State<AppState>,
    Form(submit): Form<ContactSubmit>,
) -> Response {
    let form = submit.form();

    if !state.service_context.csrf.validate_token(&submit.csrf_token) {
        tracing::warn!("Contact form rejected: invalid CSRF token");
        return render(
            &state,
            StatusCode::FORBIDDEN,
            form,
            BTreeMap::new(),
            Some("Your form expired. Please try again.".to_string()),
            false,
        )
        .await;
    }

    match state.service_context.contact.submit(&form).await {
        Ok(ContactOutcome::Accepted(submission)) => {
            tracing::info!("Contact submission {} received", submission.id);
            render(&state, StatusCode::OK, ContactForm::default(), BTreeMap::new(), None, true).await
        }
        Ok(ContactOutcome::Invalid(errors)) => {
            render(&state, StatusCode::UNPROCESSABLE_ENTITY, form, errors, None, false).await
        }
        Err(e) => {
            tracing::error!("Failed to store contact submission: {}", e);
            render(
                &state,
                StatusCode::INTERNAL_SERVER_ERROR,
                form,
                BTreeMap::new(),
                Some("We couldn't send your message. Please try again later.".to_string()),
                false,
            )
            .await
        }
    }
}

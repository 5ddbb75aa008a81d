use std::{collections::BTreeMap, sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    domain::{field_messages, ContactForm, ContactSubmission},
    error::{AppError, Result},
    repository::ContactRepository,
};

#[derive(Debug)]
pub enum ContactOutcome {
    Accepted(ContactSubmission),
    /// Per-field messages for inline display.
    Invalid(BTreeMap<String, String>),
}

pub struct ContactService {
    repo: Arc<dyn ContactRepository>,
    client: reqwest::Client,
    forward_url: Option<String>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn ContactRepository>, forward_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            repo,
            client,
            forward_url: forward_url.filter(|u| !u.trim().is_empty()),
        })
    }

    /// Validate, store, and forward a contact submission. Forwarding is
    /// best-effort: a failure leaves the submission stored but unforwarded.
    pub async fn submit(&self, form: &ContactForm) -> Result<ContactOutcome> {
        let form = form.normalized();
        if let Err(errors) = form.validate() {
            return Ok(ContactOutcome::Invalid(field_messages(&errors)));
        }

        let mut submission = self.repo.create(&form).await?;
        tracing::info!("Stored contact submission {}", submission.id);

        if let Some(url) = &self.forward_url {
            match self.forward(url, &form).await {
                Ok(()) => {
                    self.repo.mark_forwarded(submission.id).await?;
                    submission.forwarded = true;
                }
                Err(e) => tracing::warn!("Failed to forward contact submission {}: {}", submission.id, e),
            }
        }

        Ok(ContactOutcome::Accepted(submission))
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<ContactSubmission>> {
        self.repo.list_recent(limit).await
    }

    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }

    async fn forward(&self, url: &str, form: &ContactForm) -> Result<()> {
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| AppError::Internal(format!("Failed to encode contact form: {}", e)))?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::External(format!(
                "Contact forward returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

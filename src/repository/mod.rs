use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod contact_repository;

pub use contact_repository::SqliteContactRepository;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, form: &ContactForm) -> Result<ContactSubmission>;
    async fn mark_forwarded(&self, id: Uuid) -> Result<()>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<ContactSubmission>>;
    async fn count(&self) -> Result<i64>;
}

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{ContactForm, ContactSubmission},
    error::{AppError, Result},
    repository::ContactRepository,
};

#[derive(FromRow)]
struct ContactSubmissionRow {
    id: String,
    name: String,
    email: String,
    subject: String,
    message: String,
    forwarded: i32,
    created_at: NaiveDateTime,
}

pub struct SqliteContactRepository {
    pool: SqlitePool,
}

impl SqliteContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_submission(row: ContactSubmissionRow) -> Result<ContactSubmission> {
        Ok(ContactSubmission {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            forwarded: row.forwarded != 0,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn create(&self, form: &ContactForm) -> Result<ContactSubmission> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO contact_submissions (id, name, email, subject, message, forwarded, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&form.name)
        .bind(&form.email)
        .bind(&form.subject)
        .bind(&form.message)
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(ContactSubmission {
            id,
            name: form.name.clone(),
            email: form.email.clone(),
            subject: form.subject.clone(),
            message: form.message.clone(),
            forwarded: false,
            created_at: now,
        })
    }

    async fn mark_forwarded(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE contact_submissions SET forwarded = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contact submission {} not found", id)));
        }

        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<ContactSubmission>> {
        let rows = sqlx::query_as::<_, ContactSubmissionRow>(
            r#"
            SELECT id, name, email, subject, message, forwarded, created_at
            FROM contact_submissions
            ORDER BY created_at DESC
            LIMIT ?
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_submission).collect()
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

//! Notification history: an append-only log of successful dispatches.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{HistoryRecord, Message, NewHistoryRecord, Recipient};

/// Storage for history records
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: NewHistoryRecord) -> AppResult<()>;

    /// Most recent records for one recipient id, newest first
    async fn list_for_recipient(
        &self,
        recipient_id: &str,
        limit: i64,
    ) -> AppResult<Vec<HistoryRecord>>;
}

/// History store backed by the `notifications` table
#[derive(Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append(&self, record: NewHistoryRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (recipient_id, role, title, body, data)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.recipient_id)
        .bind(record.role.as_str())
        .bind(&record.title)
        .bind(&record.body)
        .bind(Json(&record.data))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: &str,
        limit: i64,
    ) -> AppResult<Vec<HistoryRecord>> {
        let records = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT id, recipient_id, role, title, body, data, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(recipient_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

/// Best-effort writer used by the dispatch engine.
///
/// History is diagnostic only: a failed append is logged and never reaches
/// the caller.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, recipient: &Recipient, message: &Message) {
        let record = NewHistoryRecord::new(recipient, message);

        match self.store.append(record).await {
            Ok(()) => log::info!(
                "Recorded notification '{}' for {}",
                message.title,
                recipient
            ),
            Err(e) => log::error!(
                "Failed to record notification history for {}: {}",
                recipient,
                e
            ),
        }
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use unimart_core::messaging::Message;
use unimart_core::repository::{MessageRepository, RepoError};

use crate::codec;

pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    listing_kind: Option<String>,
    listing_id: Option<Uuid>,
    subject: String,
    body: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Result<Message, RepoError> {
        let listing = match (self.listing_kind, self.listing_id) {
            (Some(kind), Some(id)) => Some(codec::parse_listing_ref(&kind, id)?),
            _ => None,
        };
        Ok(Message {
            id: self.id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            listing,
            subject: self.subject,
            body: self.body,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: &Message) -> Result<(), RepoError> {
        let (kind, listing_id) = match message.listing {
            Some(listing) => {
                let (kind, id) = codec::listing_ref_columns(listing);
                (Some(kind), Some(id))
            }
            None => (None, None),
        };
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, sender_id, recipient_id, listing_kind, listing_id,
                subject, body, is_read, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(kind)
        .bind(listing_id)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(message.is_read)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn inbox(&self, recipient_id: Uuid) -> Result<Vec<Message>, RepoError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages WHERE recipient_id = $1 ORDER BY created_at DESC",
        )
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MessageRow::into_message).collect()
    }

    async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<(), RepoError> {
        // Scoped to the recipient so nobody marks another inbox's mail.
        sqlx::query("UPDATE messages SET is_read = TRUE WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn unread_count(&self, recipient_id: Uuid) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }
}

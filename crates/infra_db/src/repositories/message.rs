//! Message repository
//!
//! Writes are synchronized: a save upserts the local row and creates the
//! message on the remote platform inside one database transaction, so a
//! failed remote call leaves no local trace. Deletion is rejected by the
//! platform before anything local happens, which keeps the local row.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::identifiers::MessageId;
use core_kernel::mapping::build_request;
use core_kernel::remote::RemoteId;
use domain_campaign::message::{Message, MessageType};
use domain_campaign::ports::CampaignPlatform;

use crate::error::{DatabaseError, SyncError};

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    message_id: Uuid,
    remote_id: Option<i64>,
    name: String,
    subject: String,
    description: String,
    encoding: String,
    from_name: String,
    from_email: String,
    reply_to_name: String,
    reply_to_email: String,
    to_address: String,
    message_type: String,
    hotmail_unsub_flag: bool,
    is_bounceback: bool,
    body: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl MessageRow {
    fn into_domain(self) -> Result<Message, DatabaseError> {
        let message_type = match self.message_type.as_str() {
            "email" => MessageType::Email,
            "sms" => MessageType::Sms,
            other => return Err(DatabaseError::corrupt("message_type", other)),
        };

        Ok(Message {
            id: MessageId::from_uuid(self.message_id),
            remote_id: self.remote_id.map(RemoteId::new),
            name: self.name,
            subject: self.subject,
            description: self.description,
            encoding: self.encoding,
            from_name: self.from_name,
            from_email: self.from_email,
            reply_to_name: self.reply_to_name,
            reply_to_email: self.reply_to_email,
            to: self.to_address,
            message_type,
            hotmail_unsub_flag: self.hotmail_unsub_flag,
            is_bounceback: self.is_bounceback,
            body: self.body,
            created_at: self.created_at,
        })
    }
}

/// Repository for email messages
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saves the message locally and on the platform in one unit of work
    ///
    /// On success the message carries the platform-assigned remote id.
    #[instrument(skip_all, fields(message = %message.id))]
    pub async fn save(
        &self,
        message: &mut Message,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        upsert_row(&mut tx, message).await?;

        let request = build_request(message)?;
        let remote_id = platform.create_message(&request).await?;
        message.remote_id = Some(remote_id);

        sqlx::query("UPDATE messages SET remote_id = $2 WHERE message_id = $1")
            .bind(*message.id.as_uuid())
            .bind(remote_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deletes the message on the platform first, then locally
    ///
    /// The platform rejects message deletion, so the local row is never
    /// touched.
    #[instrument(skip_all, fields(message = %message.id))]
    pub async fn delete(
        &self,
        message: &Message,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        platform.delete_message().await?;

        sqlx::query("DELETE FROM messages WHERE message_id = $1")
            .bind(*message.id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Loads a message by its local identifier
    pub async fn find(&self, id: MessageId) -> Result<Message, DatabaseError> {
        let row: MessageRow = sqlx::query_as("SELECT * FROM messages WHERE message_id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Message", id))?;

        row.into_domain()
    }
}

async fn upsert_row(
    tx: &mut Transaction<'_, Postgres>,
    message: &Message,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO messages (
            message_id, remote_id, name, subject, description, encoding,
            from_name, from_email, reply_to_name, reply_to_email, to_address,
            message_type, hotmail_unsub_flag, is_bounceback, body, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        ON CONFLICT (message_id) DO UPDATE SET
            name = EXCLUDED.name,
            subject = EXCLUDED.subject,
            description = EXCLUDED.description,
            encoding = EXCLUDED.encoding,
            from_name = EXCLUDED.from_name,
            from_email = EXCLUDED.from_email,
            reply_to_name = EXCLUDED.reply_to_name,
            reply_to_email = EXCLUDED.reply_to_email,
            to_address = EXCLUDED.to_address,
            message_type = EXCLUDED.message_type,
            hotmail_unsub_flag = EXCLUDED.hotmail_unsub_flag,
            is_bounceback = EXCLUDED.is_bounceback,
            body = EXCLUDED.body
        "#,
    )
    .bind(*message.id.as_uuid())
    .bind(message.remote_id.map(|id| id.value()))
    .bind(&message.name)
    .bind(&message.subject)
    .bind(&message.description)
    .bind(&message.encoding)
    .bind(&message.from_name)
    .bind(&message.from_email)
    .bind(&message.reply_to_name)
    .bind(&message.reply_to_email)
    .bind(&message.to)
    .bind(message.message_type.as_str())
    .bind(message.hotmail_unsub_flag)
    .bind(message.is_bounceback)
    .bind(&message.body)
    .bind(message.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

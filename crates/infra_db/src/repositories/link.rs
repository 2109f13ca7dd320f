//! Link repository
//!
//! Links do not map to a request object; the platform creates them with
//! per-kind procedures that take the owning message's remote id and the
//! link's scalar attributes. The message must therefore already be
//! synchronized before any of its links can be saved.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::identifiers::LinkId;
use core_kernel::remote::RemoteId;
use domain_campaign::link::{Link, LinkKind};
use domain_campaign::message::MessageRef;
use domain_campaign::ports::CampaignPlatform;

use crate::error::{DatabaseError, SyncError};

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    link_id: Uuid,
    kind: String,
    name: String,
    url: Option<String>,
    error_url: Option<String>,
    message_id: Uuid,
    message_remote_id: Option<i64>,
}

impl LinkRow {
    fn into_domain(self) -> Result<Link, DatabaseError> {
        let kind = match self.kind.as_str() {
            "standard" => LinkKind::Standard,
            "mirror" => LinkKind::Mirror,
            "unsubscribe" => LinkKind::Unsubscribe,
            other => return Err(DatabaseError::corrupt("kind", other)),
        };

        Ok(Link {
            id: LinkId::from_uuid(self.link_id),
            kind,
            name: self.name,
            url: self.url,
            error_url: self.error_url,
            message: MessageRef {
                id: core_kernel::identifiers::MessageId::from_uuid(self.message_id),
                remote_id: self.message_remote_id.map(RemoteId::new),
            },
        })
    }
}

/// Repository for message links
#[derive(Debug, Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saves the link locally and creates it under its message remotely
    #[instrument(skip_all, fields(link = %link.id))]
    pub async fn save(
        &self,
        link: &Link,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        link.validate()?;
        let message_id = link.message.require_remote_id("Link", "message")?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO links (link_id, kind, name, url, error_url, message_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (link_id) DO UPDATE SET
                kind = EXCLUDED.kind,
                name = EXCLUDED.name,
                url = EXCLUDED.url,
                error_url = EXCLUDED.error_url,
                message_id = EXCLUDED.message_id
            "#,
        )
        .bind(*link.id.as_uuid())
        .bind(link.kind.as_str())
        .bind(&link.name)
        .bind(&link.url)
        .bind(&link.error_url)
        .bind(*link.message.id.as_uuid())
        .execute(&mut *tx)
        .await?;

        create_remote(link, message_id, platform).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Loads a link by its local identifier
    pub async fn find(&self, id: LinkId) -> Result<Link, DatabaseError> {
        let row: LinkRow = sqlx::query_as(
            r#"
            SELECT l.link_id, l.kind, l.name, l.url, l.error_url,
                   l.message_id, m.remote_id AS message_remote_id
            FROM links l
            JOIN messages m ON m.message_id = l.message_id
            WHERE l.link_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Link", id))?;

        row.into_domain()
    }
}

async fn create_remote(
    link: &Link,
    message_id: RemoteId,
    platform: &dyn CampaignPlatform,
) -> Result<(), SyncError> {
    // validate() has already established the urls each kind requires.
    match link.kind {
        LinkKind::Standard => {
            let url = link.url.as_deref().unwrap_or_default();
            platform.create_standard_link(message_id, &link.name, url).await?;
        }
        LinkKind::Mirror => {
            platform.create_mirror_link(message_id, &link.name).await?;
        }
        LinkKind::Unsubscribe => {
            let url = link.url.as_deref().unwrap_or_default();
            let error_url = link.error_url.as_deref().unwrap_or_default();
            platform
                .create_unsubscribe_link(message_id, &link.name, url, error_url)
                .await?;
        }
    }
    Ok(())
}

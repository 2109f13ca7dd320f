//! Campaign repository

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use core_kernel::identifiers::{CampaignId, MessageId, SegmentId};
use core_kernel::mapping::build_request;
use core_kernel::remote::RemoteId;
use domain_campaign::campaign::Campaign;
use domain_campaign::error::CampaignError;
use domain_campaign::message::MessageRef;
use domain_campaign::ports::CampaignPlatform;
use domain_campaign::segment::SegmentRef;

use crate::error::{DatabaseError, SyncError};

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    campaign_id: Uuid,
    remote_id: Option<i64>,
    name: String,
    description: Option<String>,
    analytics: bool,
    deliver_speed: i64,
    dedup_email: bool,
    life_status: Option<String>,
    notify_progress: bool,
    post_click_tracking: bool,
    send_at: chrono::DateTime<chrono::Utc>,
    status: Option<String>,
    strategy: Option<String>,
    target: Option<String>,
    url_end_campaign: String,
    valid: Option<String>,
    format: Option<String>,
    url_host: Option<String>,
    segment_ids: Option<String>,
    segment_id: Uuid,
    segment_remote_id: Option<i64>,
    message_id: Uuid,
    message_remote_id: Option<i64>,
}

impl CampaignRow {
    fn into_domain(self) -> Campaign {
        Campaign {
            id: CampaignId::from_uuid(self.campaign_id),
            remote_id: self.remote_id.map(RemoteId::new),
            name: self.name,
            description: self.description,
            analytics: self.analytics,
            deliver_speed: self.deliver_speed,
            dedup_email: self.dedup_email,
            life_status: self.life_status,
            notify_progress: self.notify_progress,
            post_click_tracking: self.post_click_tracking,
            send_at: self.send_at,
            status: self.status,
            strategy: self.strategy,
            target: self.target,
            url_end_campaign: self.url_end_campaign,
            valid: self.valid,
            format: self.format,
            url_host: self.url_host,
            segment_ids: self.segment_ids,
            segment: SegmentRef {
                id: SegmentId::from_uuid(self.segment_id),
                remote_id: self.segment_remote_id.map(RemoteId::new),
            },
            message: MessageRef {
                id: MessageId::from_uuid(self.message_id),
                remote_id: self.message_remote_id.map(RemoteId::new),
            },
        }
    }
}

/// Repository for campaigns
#[derive(Debug, Clone)]
pub struct CampaignRepository {
    pool: PgPool,
}

impl CampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saves the campaign locally and on the platform in one unit of work
    #[instrument(skip_all, fields(campaign = %campaign.id))]
    pub async fn save(
        &self,
        campaign: &mut Campaign,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        upsert_row(&mut tx, campaign).await?;

        let request = build_request(campaign)?;
        let remote_id = platform.create_campaign(&request).await?;
        campaign.remote_id = Some(remote_id);

        sqlx::query("UPDATE campaigns SET remote_id = $2 WHERE campaign_id = $1")
            .bind(*campaign.id.as_uuid())
            .bind(remote_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Posts a synchronized campaign for sending
    ///
    /// A platform refusal surfaces as a rejection, not a transport error.
    #[instrument(skip_all, fields(campaign = %campaign.id))]
    pub async fn post(
        &self,
        campaign: &Campaign,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        let remote_id = campaign
            .remote_id
            .ok_or(CampaignError::NotSynchronized("Campaign"))?;

        platform.post_campaign(remote_id).await?;
        info!(remote_id = %remote_id, "campaign posted");
        Ok(())
    }

    /// Loads a campaign by its local identifier
    pub async fn find(&self, id: CampaignId) -> Result<Campaign, DatabaseError> {
        let row: CampaignRow = sqlx::query_as(
            r#"
            SELECT c.campaign_id, c.remote_id, c.name, c.description, c.analytics,
                   c.deliver_speed, c.dedup_email, c.life_status, c.notify_progress,
                   c.post_click_tracking, c.send_at, c.status, c.strategy, c.target,
                   c.url_end_campaign, c.valid, c.format, c.url_host, c.segment_ids,
                   c.segment_id, s.remote_id AS segment_remote_id,
                   c.message_id, m.remote_id AS message_remote_id
            FROM campaigns c
            JOIN segments s ON s.segment_id = c.segment_id
            JOIN messages m ON m.message_id = c.message_id
            WHERE c.campaign_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Campaign", id))?;

        Ok(row.into_domain())
    }
}

async fn upsert_row(
    tx: &mut Transaction<'_, Postgres>,
    campaign: &Campaign,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO campaigns (
            campaign_id, remote_id, name, description, analytics, deliver_speed,
            dedup_email, life_status, notify_progress, post_click_tracking,
            send_at, status, strategy, target, url_end_campaign, valid, format,
            url_host, segment_ids, segment_id, message_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
        ON CONFLICT (campaign_id) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            analytics = EXCLUDED.analytics,
            deliver_speed = EXCLUDED.deliver_speed,
            dedup_email = EXCLUDED.dedup_email,
            life_status = EXCLUDED.life_status,
            notify_progress = EXCLUDED.notify_progress,
            post_click_tracking = EXCLUDED.post_click_tracking,
            send_at = EXCLUDED.send_at,
            status = EXCLUDED.status,
            strategy = EXCLUDED.strategy,
            target = EXCLUDED.target,
            url_end_campaign = EXCLUDED.url_end_campaign,
            valid = EXCLUDED.valid,
            format = EXCLUDED.format,
            url_host = EXCLUDED.url_host,
            segment_ids = EXCLUDED.segment_ids,
            segment_id = EXCLUDED.segment_id,
            message_id = EXCLUDED.message_id
        "#,
    )
    .bind(*campaign.id.as_uuid())
    .bind(campaign.remote_id.map(|id| id.value()))
    .bind(&campaign.name)
    .bind(&campaign.description)
    .bind(campaign.analytics)
    .bind(campaign.deliver_speed)
    .bind(campaign.dedup_email)
    .bind(&campaign.life_status)
    .bind(campaign.notify_progress)
    .bind(campaign.post_click_tracking)
    .bind(campaign.send_at)
    .bind(&campaign.status)
    .bind(&campaign.strategy)
    .bind(&campaign.target)
    .bind(&campaign.url_end_campaign)
    .bind(&campaign.valid)
    .bind(&campaign.format)
    .bind(&campaign.url_host)
    .bind(&campaign.segment_ids)
    .bind(*campaign.segment.id.as_uuid())
    .bind(*campaign.message.id.as_uuid())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

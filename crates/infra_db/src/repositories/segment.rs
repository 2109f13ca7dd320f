//! Segment repository

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use core_kernel::identifiers::SegmentId;
use core_kernel::mapping::build_request;
use core_kernel::remote::RemoteId;
use domain_campaign::ports::CampaignPlatform;
use domain_campaign::segment::{SampleType, Segment};

use crate::error::{DatabaseError, SyncError};

#[derive(Debug, sqlx::FromRow)]
struct SegmentRow {
    segment_id: Uuid,
    remote_id: Option<i64>,
    name: String,
    description: String,
    sample_rate: Option<Decimal>,
    sample_type: String,
    created_at: chrono::DateTime<chrono::Utc>,
    modified_at: chrono::DateTime<chrono::Utc>,
}

impl SegmentRow {
    fn into_domain(self) -> Result<Segment, DatabaseError> {
        let sample_type = match self.sample_type.as_str() {
            "ALL" => SampleType::All,
            "PERCENT" => SampleType::Percent,
            "FIX" => SampleType::Fix,
            other => return Err(DatabaseError::corrupt("sample_type", other)),
        };

        Ok(Segment {
            id: SegmentId::from_uuid(self.segment_id),
            remote_id: self.remote_id.map(RemoteId::new),
            name: self.name,
            description: self.description,
            sample_rate: self.sample_rate,
            sample_type,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

/// Repository for segments
#[derive(Debug, Clone)]
pub struct SegmentRepository {
    pool: PgPool,
}

impl SegmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saves the segment locally and on the platform in one unit of work
    #[instrument(skip_all, fields(segment = %segment.id))]
    pub async fn save(
        &self,
        segment: &mut Segment,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;
        upsert_row(&mut tx, segment).await?;

        let request = build_request(segment)?;
        let remote_id = platform.create_segment(&request).await?;
        segment.remote_id = Some(remote_id);

        sqlx::query("UPDATE segments SET remote_id = $2 WHERE segment_id = $1")
            .bind(*segment.id.as_uuid())
            .bind(remote_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deletes the segment on the platform first, then locally
    ///
    /// The platform rejects segment deletion, so the local row is never
    /// touched.
    #[instrument(skip_all, fields(segment = %segment.id))]
    pub async fn delete(
        &self,
        segment: &Segment,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        platform.delete_segment().await?;

        sqlx::query("DELETE FROM segments WHERE segment_id = $1")
            .bind(*segment.id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Loads a segment by its local identifier
    pub async fn find(&self, id: SegmentId) -> Result<Segment, DatabaseError> {
        let row: SegmentRow = sqlx::query_as("SELECT * FROM segments WHERE segment_id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Segment", id))?;

        row.into_domain()
    }
}

async fn upsert_row(
    tx: &mut Transaction<'_, Postgres>,
    segment: &Segment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO segments (
            segment_id, remote_id, name, description, sample_rate,
            sample_type, created_at, modified_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (segment_id) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            sample_rate = EXCLUDED.sample_rate,
            sample_type = EXCLUDED.sample_type,
            modified_at = EXCLUDED.modified_at
        "#,
    )
    .bind(*segment.id.as_uuid())
    .bind(segment.remote_id.map(|id| id.value()))
    .bind(&segment.name)
    .bind(&segment.description)
    .bind(segment.sample_rate)
    .bind(segment.sample_type.as_str())
    .bind(segment.created_at)
    .bind(segment.modified_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

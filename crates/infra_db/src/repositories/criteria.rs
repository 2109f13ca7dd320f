//! Criteria repositories
//!
//! String and numeric demographic criteria attach to a segment. The
//! platform assigns them no identifier of their own; a save upserts the
//! local row and adds the criteria to the already-synchronized segment.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use core_kernel::identifiers::{CriteriaId, NumericCriteriaId, SegmentId};
use core_kernel::mapping::build_request;
use core_kernel::remote::RemoteId;
use domain_campaign::criteria::{Criteria, NumericCriteria};
use domain_campaign::ports::CampaignPlatform;
use domain_campaign::segment::SegmentRef;

use crate::error::{DatabaseError, SyncError};

#[derive(Debug, sqlx::FromRow)]
struct CriteriaRow {
    criteria_id: Uuid,
    group_name: Option<String>,
    order_frag: Option<i64>,
    group_number: Option<i64>,
    column_name: String,
    operator: String,
    string_values: Vec<String>,
    segment_id: Uuid,
    segment_remote_id: Option<i64>,
}

impl CriteriaRow {
    fn into_domain(self) -> Criteria {
        Criteria {
            id: CriteriaId::from_uuid(self.criteria_id),
            group_name: self.group_name,
            order_frag: self.order_frag,
            group_number: self.group_number,
            column_name: self.column_name,
            operator: self.operator,
            values: self.string_values,
            segment: SegmentRef {
                id: SegmentId::from_uuid(self.segment_id),
                remote_id: self.segment_remote_id.map(RemoteId::new),
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NumericCriteriaRow {
    criteria_id: Uuid,
    group_name: Option<String>,
    order_frag: Option<i64>,
    group_number: Option<i64>,
    column_name: String,
    operator: String,
    first_value: i64,
    second_value: Option<i64>,
    segment_id: Uuid,
    segment_remote_id: Option<i64>,
}

impl NumericCriteriaRow {
    fn into_domain(self) -> NumericCriteria {
        NumericCriteria {
            id: NumericCriteriaId::from_uuid(self.criteria_id),
            group_name: self.group_name,
            order_frag: self.order_frag,
            group_number: self.group_number,
            column_name: self.column_name,
            operator: self.operator,
            first_value: self.first_value,
            second_value: self.second_value,
            segment: SegmentRef {
                id: SegmentId::from_uuid(self.segment_id),
                remote_id: self.segment_remote_id.map(RemoteId::new),
            },
        }
    }
}

/// Repository for string and numeric demographic criteria
#[derive(Debug, Clone)]
pub struct CriteriaRepository {
    pool: PgPool,
}

impl CriteriaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saves a string criteria and adds it to its segment remotely
    #[instrument(skip_all, fields(criteria = %criteria.id))]
    pub async fn save_string(
        &self,
        criteria: &Criteria,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO string_criteria (
                criteria_id, group_name, order_frag, group_number,
                column_name, operator, string_values, segment_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (criteria_id) DO UPDATE SET
                group_name = EXCLUDED.group_name,
                order_frag = EXCLUDED.order_frag,
                group_number = EXCLUDED.group_number,
                column_name = EXCLUDED.column_name,
                operator = EXCLUDED.operator,
                string_values = EXCLUDED.string_values,
                segment_id = EXCLUDED.segment_id
            "#,
        )
        .bind(*criteria.id.as_uuid())
        .bind(&criteria.group_name)
        .bind(criteria.order_frag)
        .bind(criteria.group_number)
        .bind(&criteria.column_name)
        .bind(&criteria.operator)
        .bind(&criteria.values)
        .bind(*criteria.segment.id.as_uuid())
        .execute(&mut *tx)
        .await?;

        let request = build_request(criteria)?;
        platform.add_string_criteria(&request).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Saves a numeric criteria and adds it to its segment remotely
    #[instrument(skip_all, fields(criteria = %criteria.id))]
    pub async fn save_numeric(
        &self,
        criteria: &NumericCriteria,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO numeric_criteria (
                criteria_id, group_name, order_frag, group_number,
                column_name, operator, first_value, second_value, segment_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (criteria_id) DO UPDATE SET
                group_name = EXCLUDED.group_name,
                order_frag = EXCLUDED.order_frag,
                group_number = EXCLUDED.group_number,
                column_name = EXCLUDED.column_name,
                operator = EXCLUDED.operator,
                first_value = EXCLUDED.first_value,
                second_value = EXCLUDED.second_value,
                segment_id = EXCLUDED.segment_id
            "#,
        )
        .bind(*criteria.id.as_uuid())
        .bind(&criteria.group_name)
        .bind(criteria.order_frag)
        .bind(criteria.group_number)
        .bind(&criteria.column_name)
        .bind(&criteria.operator)
        .bind(criteria.first_value)
        .bind(criteria.second_value)
        .bind(*criteria.segment.id.as_uuid())
        .execute(&mut *tx)
        .await?;

        let request = build_request(criteria)?;
        platform.add_numeric_criteria(&request).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a string criteria on the platform first, then locally
    ///
    /// The platform rejects criteria deletion, so the local row is never
    /// touched.
    #[instrument(skip_all, fields(criteria = %criteria.id))]
    pub async fn delete_string(
        &self,
        criteria: &Criteria,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        platform.delete_criteria().await?;

        sqlx::query("DELETE FROM string_criteria WHERE criteria_id = $1")
            .bind(*criteria.id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes a numeric criteria on the platform first, then locally
    ///
    /// Same contract as [`Self::delete_string`].
    #[instrument(skip_all, fields(criteria = %criteria.id))]
    pub async fn delete_numeric(
        &self,
        criteria: &NumericCriteria,
        platform: &dyn CampaignPlatform,
    ) -> Result<(), SyncError> {
        platform.delete_criteria().await?;

        sqlx::query("DELETE FROM numeric_criteria WHERE criteria_id = $1")
            .bind(*criteria.id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Loads a string criteria by its local identifier
    pub async fn find_string(&self, id: CriteriaId) -> Result<Criteria, DatabaseError> {
        let row: CriteriaRow = sqlx::query_as(
            r#"
            SELECT c.criteria_id, c.group_name, c.order_frag, c.group_number,
                   c.column_name, c.operator, c.string_values,
                   c.segment_id, s.remote_id AS segment_remote_id
            FROM string_criteria c
            JOIN segments s ON s.segment_id = c.segment_id
            WHERE c.criteria_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Criteria", id))?;

        Ok(row.into_domain())
    }

    /// Loads a numeric criteria by its local identifier
    pub async fn find_numeric(
        &self,
        id: NumericCriteriaId,
    ) -> Result<NumericCriteria, DatabaseError> {
        let row: NumericCriteriaRow = sqlx::query_as(
            r#"
            SELECT c.criteria_id, c.group_name, c.order_frag, c.group_number,
                   c.column_name, c.operator, c.first_value, c.second_value,
                   c.segment_id, s.remote_id AS segment_remote_id
            FROM numeric_criteria c
            JOIN segments s ON s.segment_id = c.segment_id
            WHERE c.criteria_id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("NumericCriteria", id))?;

        Ok(row.into_domain())
    }
}

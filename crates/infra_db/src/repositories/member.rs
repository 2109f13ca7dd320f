//! Member repository
//!
//! Members carry no remote identifier; the platform keys them by email.
//! Deleting a member never removes data anywhere: it deactivates the
//! local row and pushes the deactivated state to the platform.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use core_kernel::identifiers::MemberId;
use domain_member::member::Member;
use domain_member::ports::MemberPlatform;

use crate::error::{DatabaseError, SyncError};

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    member_id: Uuid,
    email: String,
    firstname: Option<String>,
    lastname: Option<String>,
    phone: Option<String>,
    zipcode: Option<String>,
    address: Option<String>,
    company_trade_name: Option<String>,
    company_address: Option<String>,
    company_zipcode: Option<String>,
    company_email: Option<String>,
    company_type: Option<String>,
    cif: Option<String>,
    company_activities: Option<String>,
    company_phone: Option<String>,
    is_active: bool,
    province_id: Option<i64>,
    city_id: Option<i64>,
    company_category_id: Option<i64>,
    company_province_id: Option<i64>,
    company_city_id: Option<i64>,
}

impl MemberRow {
    fn into_domain(self) -> Member {
        Member {
            id: MemberId::from_uuid(self.member_id),
            email: self.email,
            firstname: self.firstname,
            lastname: self.lastname,
            phone: self.phone,
            zipcode: self.zipcode,
            address: self.address,
            company_trade_name: self.company_trade_name,
            company_address: self.company_address,
            company_zipcode: self.company_zipcode,
            company_email: self.company_email,
            company_type: self.company_type,
            cif: self.cif,
            company_activities: self.company_activities,
            company_phone: self.company_phone,
            is_active: self.is_active,
            province_id: self.province_id,
            city_id: self.city_id,
            company_category_id: self.company_category_id,
            company_province_id: self.company_province_id,
            company_city_id: self.company_city_id,
        }
    }
}

/// Repository for members
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saves the member locally and pushes it to the member database
    #[instrument(skip_all, fields(member = %member.id))]
    pub async fn save(
        &self,
        member: &Member,
        platform: &dyn MemberPlatform,
    ) -> Result<(), SyncError> {
        member.validate()?;

        let mut tx = self.pool.begin().await?;
        upsert_row(&mut tx, member).await?;

        platform.upsert_member(&member.sync_request()).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deactivates the member and pushes the deactivated state
    #[instrument(skip_all, fields(member = %member.id))]
    pub async fn delete(
        &self,
        member: &mut Member,
        platform: &dyn MemberPlatform,
    ) -> Result<(), SyncError> {
        member.is_active = false;

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE members SET is_active = FALSE WHERE member_id = $1")
            .bind(*member.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        platform.upsert_member(&member.sync_request()).await?;

        tx.commit().await?;
        info!("member deactivated");
        Ok(())
    }

    /// Re-subscribes a member on the platform and reactivates it locally
    #[instrument(skip_all, fields(member = %member.id))]
    pub async fn rejoin(
        &self,
        member: &mut Member,
        platform: &dyn MemberPlatform,
    ) -> Result<(), SyncError> {
        member.is_active = true;

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE members SET is_active = TRUE WHERE member_id = $1")
            .bind(*member.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        platform.rejoin_member(&member.email).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Unsubscribes a member on the platform and deactivates it locally
    #[instrument(skip_all, fields(member = %member.id))]
    pub async fn unjoin(
        &self,
        member: &mut Member,
        platform: &dyn MemberPlatform,
    ) -> Result<(), SyncError> {
        member.is_active = false;

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE members SET is_active = FALSE WHERE member_id = $1")
            .bind(*member.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        platform.unjoin_member(&member.email).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Loads a member by its local identifier
    pub async fn find(&self, id: MemberId) -> Result<Member, DatabaseError> {
        let row: MemberRow = sqlx::query_as("SELECT * FROM members WHERE member_id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Member", id))?;

        Ok(row.into_domain())
    }

    /// Loads a member by email, the platform's member key
    pub async fn find_by_email(&self, email: &str) -> Result<Member, DatabaseError> {
        let row: MemberRow = sqlx::query_as("SELECT * FROM members WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Member", email))?;

        Ok(row.into_domain())
    }
}

async fn upsert_row(
    tx: &mut Transaction<'_, Postgres>,
    member: &Member,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO members (
            member_id, email, firstname, lastname, phone, zipcode, address,
            company_trade_name, company_address, company_zipcode, company_email,
            company_type, cif, company_activities, company_phone, is_active,
            province_id, city_id, company_category_id, company_province_id,
            company_city_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
        ON CONFLICT (email) DO UPDATE SET
            firstname = EXCLUDED.firstname,
            lastname = EXCLUDED.lastname,
            phone = EXCLUDED.phone,
            zipcode = EXCLUDED.zipcode,
            address = EXCLUDED.address,
            company_trade_name = EXCLUDED.company_trade_name,
            company_address = EXCLUDED.company_address,
            company_zipcode = EXCLUDED.company_zipcode,
            company_email = EXCLUDED.company_email,
            company_type = EXCLUDED.company_type,
            cif = EXCLUDED.cif,
            company_activities = EXCLUDED.company_activities,
            company_phone = EXCLUDED.company_phone,
            is_active = EXCLUDED.is_active,
            province_id = EXCLUDED.province_id,
            city_id = EXCLUDED.city_id,
            company_category_id = EXCLUDED.company_category_id,
            company_province_id = EXCLUDED.company_province_id,
            company_city_id = EXCLUDED.company_city_id
        "#,
    )
    .bind(*member.id.as_uuid())
    .bind(&member.email)
    .bind(&member.firstname)
    .bind(&member.lastname)
    .bind(&member.phone)
    .bind(&member.zipcode)
    .bind(&member.address)
    .bind(&member.company_trade_name)
    .bind(&member.company_address)
    .bind(&member.company_zipcode)
    .bind(&member.company_email)
    .bind(&member.company_type)
    .bind(&member.cif)
    .bind(&member.company_activities)
    .bind(&member.company_phone)
    .bind(member.is_active)
    .bind(member.province_id)
    .bind(member.city_id)
    .bind(member.company_category_id)
    .bind(member.company_province_id)
    .bind(member.company_city_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

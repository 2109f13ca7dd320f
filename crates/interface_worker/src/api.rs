//! Operation surface
//!
//! The set of operations jobs can request. The dispatcher resolves a
//! job's method name against this trait; the production implementation
//! wires the repositories to the remote platform gateway.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

use core_kernel::identifiers::CampaignId;
use core_kernel::ports::GatewayError;
use domain_campaign::ports::CampaignPlatform;
use domain_member::notification::Notification;
use domain_member::ports::MemberPlatform;
use infra_db::{CampaignRepository, DatabaseError, MemberRepository, SyncError};

/// Errors from executing an operation
#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Operations the dispatcher can invoke
#[async_trait]
pub trait OperationSurface: Send + Sync {
    /// Re-saves a member by email, pushing its current state remotely
    async fn sync_user(&self, email: &str) -> Result<(), OperationError>;

    /// Sends one transactional notification
    async fn send_transactional_email(
        &self,
        notification: Notification,
    ) -> Result<(), OperationError>;

    /// Creates a stored campaign on the platform and posts it
    async fn send_campaign(&self, campaign_id: CampaignId) -> Result<(), OperationError>;
}

/// Production operation surface over the database and the remote gateway
pub struct Operations<P> {
    members: MemberRepository,
    campaigns: CampaignRepository,
    platform: Arc<P>,
}

impl<P> Operations<P>
where
    P: CampaignPlatform + MemberPlatform,
{
    pub fn new(members: MemberRepository, campaigns: CampaignRepository, platform: Arc<P>) -> Self {
        Self {
            members,
            campaigns,
            platform,
        }
    }
}

#[async_trait]
impl<P> OperationSurface for Operations<P>
where
    P: CampaignPlatform + MemberPlatform,
{
    #[instrument(skip(self))]
    async fn sync_user(&self, email: &str) -> Result<(), OperationError> {
        let member = self.members.find_by_email(email).await?;
        self.members.save(&member, self.platform.as_ref()).await?;
        info!("member synchronized");
        Ok(())
    }

    #[instrument(skip_all, fields(email = %notification.email))]
    async fn send_transactional_email(
        &self,
        notification: Notification,
    ) -> Result<(), OperationError> {
        self.platform.send_notification(&notification.request()).await?;
        info!("notification sent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_campaign(&self, campaign_id: CampaignId) -> Result<(), OperationError> {
        let mut campaign = self.campaigns.find(campaign_id).await?;
        self.campaigns
            .save(&mut campaign, self.platform.as_ref())
            .await?;
        self.campaigns.post(&campaign, self.platform.as_ref()).await?;
        info!("campaign sent");
        Ok(())
    }
}

//! Platform port implementations
//!
//! One [`RemotePlatform`] serves both the campaign and member ports. The
//! campaign and member services are distinct endpoints with their own
//! sessions; notifications go to the unauthenticated notification service.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, instrument};

use core_kernel::ports::GatewayError;
use core_kernel::remote::{RemoteId, RemoteRequest};
use domain_campaign::ports::CampaignPlatform;
use domain_member::ports::MemberPlatform;

use crate::client::RemoteRpcClient;
use crate::config::RemoteConfig;
use crate::transport::HttpTransport;

/// HTTP-backed implementation of the platform ports
pub struct RemotePlatform {
    campaign: RemoteRpcClient<HttpTransport>,
    member: RemoteRpcClient<HttpTransport>,
    notification: RemoteRpcClient<HttpTransport>,
}

impl RemotePlatform {
    pub fn new(config: &RemoteConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            campaign: RemoteRpcClient::new(HttpTransport::new(&config.campaign_url, config)?),
            member: RemoteRpcClient::new(HttpTransport::new(&config.member_url, config)?),
            notification: RemoteRpcClient::new(HttpTransport::new(
                &config.notification_url,
                config,
            )?),
        })
    }
}

/// Extracts the numeric identifier a create procedure returns
fn expect_id(procedure: &str, result: Value) -> Result<RemoteId, GatewayError> {
    match result.as_i64() {
        Some(id) => Ok(RemoteId::new(id)),
        None => Err(GatewayError::protocol(
            procedure,
            format!("expected numeric identifier, got {result}"),
        )),
    }
}

#[async_trait]
impl CampaignPlatform for RemotePlatform {
    #[instrument(skip_all)]
    async fn create_message(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError> {
        let result = self
            .campaign
            .call("createEmailMessageByObj", json!({ "message": request.to_json() }))
            .await?;
        let id = expect_id("createEmailMessageByObj", result)?;
        info!(remote_id = %id, "message created on platform");
        Ok(id)
    }

    async fn delete_message(&self) -> Result<(), GatewayError> {
        Err(GatewayError::delete_unsupported("Message"))
    }

    #[instrument(skip_all)]
    async fn create_segment(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError> {
        let result = self
            .campaign
            .call("segmentationCreateSegment", json!({ "segment": request.to_json() }))
            .await?;
        let id = expect_id("segmentationCreateSegment", result)?;
        info!(remote_id = %id, "segment created on platform");
        Ok(id)
    }

    async fn delete_segment(&self) -> Result<(), GatewayError> {
        Err(GatewayError::delete_unsupported("Segment"))
    }

    #[instrument(skip_all)]
    async fn add_string_criteria(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.campaign
            .call(
                "segmentationAddStringDemographicCriteriaByObj",
                json!({ "stringDemographicCriteria": request.to_json() }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn add_numeric_criteria(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.campaign
            .call(
                "segmentationAddNumericDemographicCriteriaByObj",
                json!({ "numericDemographicCriteria": request.to_json() }),
            )
            .await?;
        Ok(())
    }

    async fn delete_criteria(&self) -> Result<(), GatewayError> {
        Err(GatewayError::delete_unsupported("Criteria"))
    }

    #[instrument(skip_all)]
    async fn create_campaign(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError> {
        let result = self
            .campaign
            .call("createCampaignByObj", json!({ "campaign": request.to_json() }))
            .await?;
        let id = expect_id("createCampaignByObj", result)?;
        info!(remote_id = %id, "campaign created on platform");
        Ok(id)
    }

    #[instrument(skip_all, fields(campaign = %id))]
    async fn post_campaign(&self, id: RemoteId) -> Result<(), GatewayError> {
        let result = self.campaign.call("postCampaign", json!({ "id": id })).await?;

        // The platform signals refusal through a false result, not an error.
        match result.as_bool() {
            Some(true) => {
                info!("campaign posted");
                Ok(())
            }
            Some(false) => Err(GatewayError::rejected(
                "postCampaign",
                "platform refused to post the campaign",
            )),
            None => Err(GatewayError::protocol(
                "postCampaign",
                format!("expected boolean, got {result}"),
            )),
        }
    }

    #[instrument(skip_all, fields(message = %message_id))]
    async fn create_standard_link(
        &self,
        message_id: RemoteId,
        name: &str,
        url: &str,
    ) -> Result<(), GatewayError> {
        self.campaign
            .call(
                "createAndAddStandardUrl",
                json!({ "messageId": message_id, "name": name, "url": url }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(message = %message_id))]
    async fn create_mirror_link(
        &self,
        message_id: RemoteId,
        name: &str,
    ) -> Result<(), GatewayError> {
        self.campaign
            .call(
                "createAndAddMirrorUrl",
                json!({ "messageId": message_id, "name": name }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(message = %message_id))]
    async fn create_unsubscribe_link(
        &self,
        message_id: RemoteId,
        name: &str,
        url: &str,
        error_url: &str,
    ) -> Result<(), GatewayError> {
        self.campaign
            .call(
                "createAndAddUnsubscribeUrl",
                json!({
                    "messageId": message_id,
                    "name": name,
                    "pageOk": url,
                    "messageOk": message_id,
                    "pageError": error_url,
                    "messageError": message_id,
                }),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MemberPlatform for RemotePlatform {
    #[instrument(skip_all)]
    async fn upsert_member(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.member
            .call("insertOrUpdateMemberByObj", json!({ "member": request.to_json() }))
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn rejoin_member(&self, email: &str) -> Result<(), GatewayError> {
        self.member
            .call("rejoinMemberByEmail", json!({ "email": email }))
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn unjoin_member(&self, email: &str) -> Result<(), GatewayError> {
        self.member
            .call("unjoinMemberByEmail", json!({ "email": email }))
            .await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn send_notification(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.notification
            .call_sessionless("sendObject", json!({ "sendrequest": request.to_json() }))
            .await?;
        Ok(())
    }
}

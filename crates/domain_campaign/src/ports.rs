//! Campaign platform port
//!
//! The port through which campaign-domain entities reach the remote
//! platform. The database layer receives an implementation by argument,
//! so tests substitute a recording double without touching shared state.

use async_trait::async_trait;

use core_kernel::ports::GatewayError;
use core_kernel::remote::{RemoteId, RemoteRequest};

/// Remote operations of the campaign management service
///
/// Each call runs inside its own remote session (opened and closed by the
/// adapter). Create calls return the platform-assigned identifier where
/// the platform produces one.
///
/// The platform cannot delete messages, segments, or criteria at all;
/// those methods reject unconditionally, before any remote interaction.
#[async_trait]
pub trait CampaignPlatform: Send + Sync {
    /// Creates or updates a message from its mapped request object
    async fn create_message(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError>;

    /// Message deletion is not supported by the platform
    async fn delete_message(&self) -> Result<(), GatewayError>;

    /// Creates or updates a segment from its mapped request object
    async fn create_segment(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError>;

    /// Segment deletion is not supported by the platform
    async fn delete_segment(&self) -> Result<(), GatewayError>;

    /// Adds a string demographic criteria to its segment
    async fn add_string_criteria(&self, request: &RemoteRequest) -> Result<(), GatewayError>;

    /// Adds a numeric demographic criteria to its segment
    async fn add_numeric_criteria(&self, request: &RemoteRequest) -> Result<(), GatewayError>;

    /// Criteria deletion is not supported by the platform
    async fn delete_criteria(&self) -> Result<(), GatewayError>;

    /// Creates or updates a campaign from its mapped request object
    async fn create_campaign(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError>;

    /// Posts a created campaign; a declined post surfaces as
    /// [`GatewayError::Rejected`]
    async fn post_campaign(&self, campaign: RemoteId) -> Result<(), GatewayError>;

    /// Creates a standard tracked URL under a message
    async fn create_standard_link(
        &self,
        message: RemoteId,
        name: &str,
        url: &str,
    ) -> Result<(), GatewayError>;

    /// Creates a mirror (online preview) URL under a message
    async fn create_mirror_link(&self, message: RemoteId, name: &str)
        -> Result<(), GatewayError>;

    /// Creates an unsubscribe URL under a message
    async fn create_unsubscribe_link(
        &self,
        message: RemoteId,
        name: &str,
        url: &str,
        error_url: &str,
    ) -> Result<(), GatewayError>;
}

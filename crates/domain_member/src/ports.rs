use async_trait::async_trait;

use core_kernel::ports::GatewayError;
use core_kernel::remote::RemoteRequest;

/// Member-side operations of the campaign platform
#[async_trait]
pub trait MemberPlatform: Send + Sync {
    /// Inserts or updates the member identified by the request's memberUID
    async fn upsert_member(&self, request: &RemoteRequest) -> Result<(), GatewayError>;

    /// Re-subscribes a previously unjoined member
    async fn rejoin_member(&self, email: &str) -> Result<(), GatewayError>;

    /// Unsubscribes a member
    async fn unjoin_member(&self, email: &str) -> Result<(), GatewayError>;

    /// Sends a transactional notification
    async fn send_notification(&self, request: &RemoteRequest) -> Result<(), GatewayError>;
}

//! Recording platform double
//!
//! One mock serves both platform ports. It records every call in order,
//! hands out sequential remote identifiers, and can be scripted to fail
//! so tests can observe rollback behavior.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::ports::GatewayError;
use core_kernel::remote::{RemoteId, RemoteRequest};
use domain_campaign::ports::CampaignPlatform;
use domain_member::ports::MemberPlatform;

/// Recording implementation of the platform ports
pub struct MockPlatform {
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<RemoteRequest>>,
    next_id: AtomicI64,
    fail: AtomicBool,
    reject_post: AtomicBool,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1000),
            fail: AtomicBool::new(false),
            reject_post: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent remote call fail with a transport error
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Makes subsequent campaign posts come back refused
    pub fn set_rejecting_posts(&self, rejecting: bool) {
        self.reject_post.store(rejecting, Ordering::SeqCst);
    }

    /// The calls made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose name starts with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// The request objects received so far, in order
    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(call.into());
        if self.fail.load(Ordering::SeqCst) {
            Err(GatewayError::unavailable("scripted failure"))
        } else {
            Ok(())
        }
    }

    fn record_request(&self, call: &str, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.record(call)
    }

    fn assign_id(&self) -> RemoteId {
        RemoteId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl CampaignPlatform for MockPlatform {
    async fn create_message(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError> {
        self.record_request("create_message", request)?;
        Ok(self.assign_id())
    }

    async fn delete_message(&self) -> Result<(), GatewayError> {
        Err(GatewayError::delete_unsupported("Message"))
    }

    async fn create_segment(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError> {
        self.record_request("create_segment", request)?;
        Ok(self.assign_id())
    }

    async fn delete_segment(&self) -> Result<(), GatewayError> {
        Err(GatewayError::delete_unsupported("Segment"))
    }

    async fn add_string_criteria(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.record_request("add_string_criteria", request)
    }

    async fn add_numeric_criteria(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.record_request("add_numeric_criteria", request)
    }

    async fn delete_criteria(&self) -> Result<(), GatewayError> {
        Err(GatewayError::delete_unsupported("Criteria"))
    }

    async fn create_campaign(&self, request: &RemoteRequest) -> Result<RemoteId, GatewayError> {
        self.record_request("create_campaign", request)?;
        Ok(self.assign_id())
    }

    async fn post_campaign(&self, campaign: RemoteId) -> Result<(), GatewayError> {
        self.record(format!("post_campaign {campaign}"))?;
        if self.reject_post.load(Ordering::SeqCst) {
            Err(GatewayError::rejected(
                "postCampaign",
                "platform refused to post the campaign",
            ))
        } else {
            Ok(())
        }
    }

    async fn create_standard_link(
        &self,
        message: RemoteId,
        name: &str,
        url: &str,
    ) -> Result<(), GatewayError> {
        self.record(format!("create_standard_link {message} {name} {url}"))
    }

    async fn create_mirror_link(&self, message: RemoteId, name: &str) -> Result<(), GatewayError> {
        self.record(format!("create_mirror_link {message} {name}"))
    }

    async fn create_unsubscribe_link(
        &self,
        message: RemoteId,
        name: &str,
        url: &str,
        error_url: &str,
    ) -> Result<(), GatewayError> {
        self.record(format!(
            "create_unsubscribe_link {message} {name} {url} {error_url}"
        ))
    }
}

#[async_trait]
impl MemberPlatform for MockPlatform {
    async fn upsert_member(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.record_request("upsert_member", request)
    }

    async fn rejoin_member(&self, email: &str) -> Result<(), GatewayError> {
        self.record(format!("rejoin_member {email}"))
    }

    async fn unjoin_member(&self, email: &str) -> Result<(), GatewayError> {
        self.record(format!("unjoin_member {email}"))
    }

    async fn send_notification(&self, request: &RemoteRequest) -> Result<(), GatewayError> {
        self.record_request("send_notification", request)
    }
}

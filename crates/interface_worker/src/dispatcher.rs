//! Job dispatcher
//!
//! A sequential JetStream pull consumer. Jobs are fetched one at a time
//! and acknowledged only after the operation succeeds; a failed job emits
//! one failure report and stays unacknowledged so the server redelivers
//! it. Delivery is therefore at-least-once and operations must tolerate
//! re-execution.

use std::time::Duration;

use async_nats::jetstream::{self, consumer::PullConsumer, stream::Stream};
use futures_util::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::OperationSurface;
use crate::config::WorkerConfig;
use crate::job::{DispatchError, JobCall};
use crate::report::{FailureReport, FailureReporter};

/// Errors from the dispatcher's queue plumbing
#[derive(Debug, Error)]
pub enum DispatcherError {
    #[error("NATS stream error: {0}")]
    Stream(String),

    #[error("NATS consumer error: {0}")]
    Consumer(String),
}

/// Routes one job payload to the operation surface
///
/// Decoding failures, unknown methods, bad arguments, and operation
/// failures all come back as [`DispatchError`]; the caller decides what
/// acknowledgement that maps to.
pub async fn route(
    surface: &dyn OperationSurface,
    payload: &[u8],
) -> Result<String, DispatchError> {
    let call = JobCall::parse(payload)?;

    match call.method.as_str() {
        "sync_user" => {
            let email = call.str_param(0, "email")?;
            surface.sync_user(&email).await?;
        }
        "send_transactional_email" => {
            let notification = notification_from(&call)?;
            surface.send_transactional_email(notification).await?;
        }
        "send_campaign" => {
            let raw = call.str_param(0, "campaign_id")?;
            let campaign_id = raw.parse().map_err(|e: uuid::Error| {
                DispatchError::InvalidArguments {
                    name: "campaign_id".to_string(),
                    reason: e.to_string(),
                }
            })?;
            surface.send_campaign(campaign_id).await?;
        }
        other => return Err(DispatchError::UnknownMethod(other.to_string())),
    }

    Ok(call.method)
}

/// Processes one job payload and decides its acknowledgement
///
/// Returns `true` when the job completed and the message should be
/// acked. A failed job emits exactly one failure report and returns
/// `false` so the message stays unacknowledged for redelivery.
pub async fn process(
    surface: &dyn OperationSurface,
    reporter: &dyn FailureReporter,
    payload: &[u8],
) -> bool {
    match route(surface, payload).await {
        Ok(method) => {
            debug!(method, "job completed");
            true
        }
        Err(error) => {
            reporter.report(FailureReport::new(&error, payload)).await;
            false
        }
    }
}

fn notification_from(call: &JobCall) -> Result<domain_member::Notification, DispatchError> {
    let mut notification = domain_member::Notification::new(
        call.str_param(0, "email")?,
        call.int_param(1, "notification_id")?,
        call.str_param(2, "random")?,
    );
    notification.encrypt = call.bool_param(3, "encrypt", false)?;

    for (key, value) in call.entries_param(4, "dyn")? {
        notification = notification.with_dyn(key, value);
    }
    for (key, value) in call.entries_param(5, "content")? {
        notification = notification.with_content(key, value);
    }

    Ok(notification)
}

/// The queue-driven worker loop
pub struct Dispatcher<S, R> {
    jetstream: jetstream::Context,
    config: WorkerConfig,
    surface: S,
    reporter: R,
}

impl<S, R> Dispatcher<S, R>
where
    S: OperationSurface,
    R: FailureReporter,
{
    pub fn new(
        jetstream: jetstream::Context,
        config: WorkerConfig,
        surface: S,
        reporter: R,
    ) -> Self {
        Self {
            jetstream,
            config,
            surface,
            reporter,
        }
    }

    /// Runs the consume loop until the shutdown signal fires
    pub async fn run(
        &self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> Result<(), DispatcherError> {
        let stream = self.ensure_stream().await?;
        let consumer = self.ensure_consumer(&stream).await?;

        info!(
            stream = %self.config.stream_name,
            consumer = %self.config.consumer_name,
            "dispatcher started"
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                result = self.consume_one(&consumer) => {
                    if let Err(e) = result {
                        warn!(error = %e, "fetch failed, backing off");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!("dispatcher stopped");
        Ok(())
    }

    async fn ensure_stream(&self) -> Result<Stream, DispatcherError> {
        self.jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: self.config.stream_name.clone(),
                subjects: vec![self.config.subject.clone()],
                ..Default::default()
            })
            .await
            .map_err(|e| DispatcherError::Stream(e.to_string()))
    }

    async fn ensure_consumer(&self, stream: &Stream) -> Result<PullConsumer, DispatcherError> {
        stream
            .get_or_create_consumer(
                &self.config.consumer_name,
                jetstream::consumer::pull::Config {
                    durable_name: Some(self.config.consumer_name.clone()),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    filter_subject: self.config.subject.clone(),
                    // Jobs are strictly sequential; one in flight at a time.
                    max_ack_pending: 1,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| DispatcherError::Consumer(e.to_string()))
    }

    async fn consume_one(&self, consumer: &PullConsumer) -> Result<(), DispatcherError> {
        let mut messages = consumer
            .fetch()
            .max_messages(1)
            .expires(Duration::from_secs(5))
            .messages()
            .await
            .map_err(|e| DispatcherError::Consumer(e.to_string()))?;

        while let Some(message) = messages.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    warn!(error = %e, "message receive failed");
                    continue;
                }
            };

            if process(&self.surface, &self.reporter, &message.payload).await {
                if let Err(e) = message.ack().await {
                    warn!(error = %e, "ack failed, job will be redelivered");
                }
            }
            // No ack on failure: the server redelivers after the deadline.
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::OperationError;
    use async_trait::async_trait;
    use core_kernel::identifiers::CampaignId;
    use core_kernel::ports::GatewayError;
    use domain_member::Notification;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSurface {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingSurface {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn record(&self, call: String) -> Result<(), OperationError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(OperationError::Gateway(GatewayError::unavailable("down")))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OperationSurface for RecordingSurface {
        async fn sync_user(&self, email: &str) -> Result<(), OperationError> {
            self.record(format!("sync_user {email}"))
        }

        async fn send_transactional_email(
            &self,
            notification: Notification,
        ) -> Result<(), OperationError> {
            self.record(format!(
                "send_transactional_email {} {}",
                notification.email, notification.notification_id
            ))
        }

        async fn send_campaign(&self, campaign_id: CampaignId) -> Result<(), OperationError> {
            self.record(format!("send_campaign {campaign_id}"))
        }
    }

    #[tokio::test]
    async fn test_route_sync_user() {
        let surface = RecordingSurface::default();
        let payload = json!({"method": "sync_user", "args": ["a@b.com"], "kwargs": {}});

        route(&surface, payload.to_string().as_bytes()).await.unwrap();

        assert_eq!(surface.calls(), vec!["sync_user a@b.com"]);
    }

    #[tokio::test]
    async fn test_route_send_transactional_email_kwargs() {
        let surface = RecordingSurface::default();
        let payload = json!({
            "method": "send_transactional_email",
            "args": [],
            "kwargs": {
                "email": "a@b.com",
                "notification_id": 31,
                "random": "tok",
                "dyn": {"FIRSTNAME": "Ada"}
            }
        });

        route(&surface, payload.to_string().as_bytes()).await.unwrap();

        assert_eq!(surface.calls(), vec!["send_transactional_email a@b.com 31"]);
    }

    #[tokio::test]
    async fn test_route_send_campaign_parses_id() {
        let surface = RecordingSurface::default();
        let id = CampaignId::new();
        let payload = json!({"method": "send_campaign", "args": [id.to_string()], "kwargs": {}});

        route(&surface, payload.to_string().as_bytes()).await.unwrap();

        assert_eq!(surface.calls(), vec![format!("send_campaign {id}")]);
    }

    #[tokio::test]
    async fn test_route_unknown_method() {
        let surface = RecordingSurface::default();
        let payload = json!({"method": "make_coffee", "args": [], "kwargs": {}});

        let error = route(&surface, payload.to_string().as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(error, DispatchError::UnknownMethod(_)));
        assert!(surface.calls().is_empty());
    }

    #[tokio::test]
    async fn test_route_surfaces_operation_failure() {
        let surface = RecordingSurface::failing();
        let payload = json!({"method": "sync_user", "args": ["a@b.com"], "kwargs": {}});

        let error = route(&surface, payload.to_string().as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(error, DispatchError::Operation(_)));
        assert_eq!(surface.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_route_undecodable_payload() {
        let surface = RecordingSurface::default();

        let error = route(&surface, b"not json").await.unwrap_err();

        assert!(matches!(error, DispatchError::Payload(_)));
    }

    #[derive(Default)]
    struct RecordingReporter {
        reports: Mutex<Vec<FailureReport>>,
    }

    #[async_trait]
    impl FailureReporter for RecordingReporter {
        async fn report(&self, report: FailureReport) {
            self.reports.lock().unwrap().push(report);
        }
    }

    #[tokio::test]
    async fn test_process_success_acks_without_reporting() {
        let surface = RecordingSurface::default();
        let reporter = RecordingReporter::default();
        let payload = json!({"method": "sync_user", "args": ["a@b.com"], "kwargs": {}});

        let ack = process(&surface, &reporter, payload.to_string().as_bytes()).await;

        assert!(ack);
        assert_eq!(surface.calls(), vec!["sync_user a@b.com"]);
        assert!(reporter.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_process_failure_reports_once_and_withholds_ack() {
        let surface = RecordingSurface::default();
        let reporter = RecordingReporter::default();
        let payload = json!({"method": "make_coffee", "args": [], "kwargs": {}});

        let ack = process(&surface, &reporter, payload.to_string().as_bytes()).await;

        assert!(!ack);
        let reports = reporter.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].error_type, "unknown_method");
    }

    #[tokio::test]
    async fn test_process_operation_failure_carries_payload_in_report() {
        let surface = RecordingSurface::failing();
        let reporter = RecordingReporter::default();
        let payload = json!({"method": "sync_user", "args": ["a@b.com"], "kwargs": {}});
        let bytes = payload.to_string();

        let ack = process(&surface, &reporter, bytes.as_bytes()).await;

        assert!(!ack);
        let reports = reporter.reports.lock().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].error_type, "operation");
        assert_eq!(reports[0].payload, bytes);
    }
}

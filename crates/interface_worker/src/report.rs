//! Failure reporting
//!
//! Every failed job produces exactly one administrative report before the
//! message is left for redelivery. Reports carry enough of the original
//! payload to replay the job by hand.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::job::DispatchError;

/// An administrative record of one failed job
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    /// When the failure was observed
    pub occurred_at: DateTime<Utc>,
    /// Variant name of the dispatch error
    pub error_type: &'static str,
    /// Rendered error message
    pub error: String,
    /// The payload of the failed job, verbatim
    pub payload: String,
}

impl FailureReport {
    pub fn new(error: &DispatchError, payload: &[u8]) -> Self {
        let error_type = match error {
            DispatchError::Payload(_) => "payload",
            DispatchError::UnknownMethod(_) => "unknown_method",
            DispatchError::InvalidArguments { .. } => "invalid_arguments",
            DispatchError::Operation(_) => "operation",
        };

        Self {
            occurred_at: Utc::now(),
            error_type,
            error: error.to_string(),
            payload: String::from_utf8_lossy(payload).into_owned(),
        }
    }
}

/// Sink for failure reports
#[async_trait]
pub trait FailureReporter: Send + Sync {
    async fn report(&self, report: FailureReport);
}

/// Reporter that writes failures to the log
pub struct LogFailureReporter;

#[async_trait]
impl FailureReporter for LogFailureReporter {
    async fn report(&self, report: FailureReport) {
        error!(
            error_type = report.error_type,
            error = %report.error,
            payload = %report.payload,
            "job failed"
        );
    }
}

/// Reporter that publishes failures to an administrative NATS subject
pub struct NatsFailureReporter {
    client: async_nats::Client,
    subject: String,
}

impl NatsFailureReporter {
    pub fn new(client: async_nats::Client, subject: impl Into<String>) -> Self {
        Self {
            client,
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl FailureReporter for NatsFailureReporter {
    async fn report(&self, report: FailureReport) {
        error!(
            error_type = report.error_type,
            error = %report.error,
            "job failed"
        );

        let body = match serde_json::to_vec(&report) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failure report not serializable");
                return;
            }
        };

        if let Err(e) = self.client.publish(self.subject.clone(), body.into()).await {
            warn!(error = %e, "failure report not published");
        }
    }
}

//! Gateway error taxonomy
//!
//! Every platform port (campaign management, member management,
//! notifications) reports failures through [`GatewayError`], so adapters
//! and repositories share one vocabulary for "the remote is unreachable"
//! versus "the remote refused the operation".

use std::fmt;
use thiserror::Error;

/// Error type for remote platform operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport or connectivity failure reaching the platform
    #[error("Remote platform unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The platform answered, but not in the shape the protocol defines
    #[error("Malformed remote response during {procedure}: {message}")]
    Protocol { procedure: String, message: String },

    /// Opening or closing the authenticated session failed
    #[error("Remote session error: {message}")]
    Session { message: String },

    /// The platform declined the requested business action
    #[error("Operation rejected by remote platform: {operation}: {reason}")]
    Rejected { operation: String, reason: String },
}

impl GatewayError {
    /// Creates an Unavailable error without an underlying source
    pub fn unavailable(message: impl Into<String>) -> Self {
        GatewayError::Unavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Unavailable error wrapping a transport error
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GatewayError::Unavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a Protocol error for the named procedure
    pub fn protocol(procedure: impl Into<String>, message: impl fmt::Display) -> Self {
        GatewayError::Protocol {
            procedure: procedure.into(),
            message: message.to_string(),
        }
    }

    /// Creates a Rejected error
    pub fn rejected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::Rejected {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// The fixed rejection for entity types the platform cannot delete
    pub fn delete_unsupported(entity: &'static str) -> Self {
        GatewayError::Rejected {
            operation: format!("delete {entity}"),
            reason: "not supported by the remote platform".to_string(),
        }
    }

    /// True for failures that may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Unavailable { .. } | GatewayError::Session { .. }
        )
    }

    /// True when the platform declined the business action
    pub fn is_rejected(&self) -> bool {
        matches!(self, GatewayError::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_is_transient() {
        assert!(GatewayError::unavailable("connection refused").is_transient());
        assert!(!GatewayError::rejected("postCampaign", "declined").is_transient());
    }

    #[test]
    fn test_delete_unsupported_is_rejection() {
        let error = GatewayError::delete_unsupported("Message");
        assert!(error.is_rejected());
        assert!(error.to_string().contains("Message"));
    }
}

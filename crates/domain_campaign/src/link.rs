//! Links tracked inside a message
//!
//! A link may be inserted in a message and tracked by the platform. Two
//! specializations share the schema: mirror links (view the message in a
//! browser) and unsubscribe links (which add a failure-redirect URL).
//! Links are created remotely with scalar procedure arguments rather than
//! a mapped request object, so they carry no field table.

use serde::{Deserialize, Serialize};

use core_kernel::identifiers::LinkId;

use crate::error::CampaignError;
use crate::message::MessageRef;

/// The specialization of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Plain tracked URL
    Standard,
    /// Online-preview (mirror) URL
    Mirror,
    /// Unsubscribe URL with success and failure redirects
    Unsubscribe,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Standard => "standard",
            LinkKind::Mirror => "mirror",
            LinkKind::Unsubscribe => "unsubscribe",
        }
    }
}

/// A URL tracked under a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Local identifier
    pub id: LinkId,
    /// Link specialization
    pub kind: LinkKind,
    /// Display name
    pub name: String,
    /// Target URL; mirror links have none
    pub url: Option<String>,
    /// Redirect when an unsubscribe attempt fails
    pub error_url: Option<String>,
    /// The message this link belongs to
    pub message: MessageRef,
}

impl Link {
    /// Creates a plain tracked link
    pub fn standard(name: impl Into<String>, url: impl Into<String>, message: MessageRef) -> Self {
        Self {
            id: LinkId::new_v7(),
            kind: LinkKind::Standard,
            name: name.into(),
            url: Some(url.into()),
            error_url: None,
            message,
        }
    }

    /// Creates a mirror (online preview) link
    pub fn mirror(name: impl Into<String>, message: MessageRef) -> Self {
        Self {
            id: LinkId::new_v7(),
            kind: LinkKind::Mirror,
            name: name.into(),
            url: None,
            error_url: None,
            message,
        }
    }

    /// Creates an unsubscribe link with success and failure redirects
    pub fn unsubscribe(
        name: impl Into<String>,
        url: impl Into<String>,
        error_url: impl Into<String>,
        message: MessageRef,
    ) -> Self {
        Self {
            id: LinkId::new_v7(),
            kind: LinkKind::Unsubscribe,
            name: name.into(),
            url: Some(url.into()),
            error_url: Some(error_url.into()),
            message,
        }
    }

    /// Validates that the link carries everything its kind requires
    pub fn validate(&self) -> Result<(), CampaignError> {
        match self.kind {
            LinkKind::Standard if self.url.is_none() => Err(CampaignError::MissingUrl),
            LinkKind::Unsubscribe if self.url.is_none() => Err(CampaignError::MissingUrl),
            LinkKind::Unsubscribe if self.error_url.is_none() => {
                Err(CampaignError::MissingErrorUrl)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::identifiers::MessageId;
    use core_kernel::remote::RemoteId;

    fn message_ref() -> MessageRef {
        MessageRef::synced(MessageId::new(), RemoteId::new(42))
    }

    #[test]
    fn test_standard_link() {
        let link = Link::standard("My url", "http://url.to.site/", message_ref());
        assert_eq!(link.kind, LinkKind::Standard);
        assert!(link.validate().is_ok());
    }

    #[test]
    fn test_mirror_link_needs_no_url() {
        let link = Link::mirror("Mirror", message_ref());
        assert!(link.url.is_none());
        assert!(link.validate().is_ok());
    }

    #[test]
    fn test_unsubscribe_link_requires_error_url() {
        let mut link = Link::unsubscribe("Unsub", "http://ok/", "http://fail/", message_ref());
        assert!(link.validate().is_ok());

        link.error_url = None;
        assert!(matches!(link.validate(), Err(CampaignError::MissingErrorUrl)));
    }
}

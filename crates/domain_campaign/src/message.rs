//! Message definition
//!
//! The message is the definition of what will be sent: subject, sender and
//! reply-to addresses, recipient expression, and the body. Links tracked
//! inside the message are managed as separate [`Link`](crate::link::Link)
//! records under the message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::identifiers::MessageId;
use core_kernel::mapping::{DefaultPolicy, FieldSpec, MappingError, RemoteObject};
use core_kernel::remote::{ParamValue, RemoteId};

/// Delivery channel for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Email delivery
    Email,
    /// SMS delivery
    Sms,
}

impl MessageType {
    /// Wire representation of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Email => "email",
            MessageType::Sms => "sms",
        }
    }
}

/// A message to be sent by the remote platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Local identifier (never sent remotely)
    pub id: MessageId,
    /// Remote identifier, present only after a successful remote create
    pub remote_id: Option<RemoteId>,
    /// Message name
    pub name: String,
    /// Email subject
    pub subject: String,
    /// Free-form description
    pub description: String,
    /// Message encoding
    pub encoding: String,
    /// Sender display name
    pub from_name: String,
    /// Sender address
    pub from_email: String,
    /// Reply-to display name
    pub reply_to_name: String,
    /// Reply-to address
    pub reply_to_email: String,
    /// Recipient expression; accepts dynamic field placeholders
    pub to: String,
    /// Delivery channel
    pub message_type: MessageType,
    /// Whether the hotmail unsubscribe link is included
    pub hotmail_unsub_flag: bool,
    /// Whether this message serves as a bounce-back message
    pub is_bounceback: bool,
    /// Message body
    pub body: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new unsynchronized message
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        to: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new_v7(),
            remote_id: None,
            name: name.into(),
            subject: subject.into(),
            description: String::new(),
            encoding: "UTF-8".to_string(),
            from_name: String::new(),
            from_email: String::new(),
            reply_to_name: String::new(),
            reply_to_email: String::new(),
            to: to.into(),
            message_type: MessageType::Email,
            hotmail_unsub_flag: true,
            is_bounceback: false,
            body: body.into(),
            created_at: Utc::now(),
        }
    }

    /// Sets the sender name and address
    pub fn with_from(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.from_name = name.into();
        self.from_email = email.into();
        self
    }

    /// Sets the reply-to name and address
    pub fn with_reply_to(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.reply_to_name = name.into();
        self.reply_to_email = email.into();
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// True once the message has a remote counterpart
    pub fn is_synchronized(&self) -> bool {
        self.remote_id.is_some()
    }
}

impl RemoteObject for Message {
    const OBJECT_NAME: &'static str = "apiMessage";

    fn field_specs() -> &'static [FieldSpec<Self>] {
        static SPECS: &[FieldSpec<Message>] = &[
            FieldSpec {
                local_name: "remote_id",
                remote_name: "id",
                read: |m| m.remote_id.map(ParamValue::Id),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "name",
                remote_name: "name",
                read: |m| Some(ParamValue::text(m.name.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "subject",
                remote_name: "subject",
                read: |m| Some(ParamValue::text(m.subject.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "description",
                remote_name: "description",
                read: |m| Some(ParamValue::text(m.description.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "encoding",
                remote_name: "encoding",
                read: |m| Some(ParamValue::text(m.encoding.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "from_name",
                remote_name: "from",
                read: |m| Some(ParamValue::text(m.from_name.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "from_email",
                remote_name: "fromEmail",
                read: |m| Some(ParamValue::text(m.from_email.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "reply_to_name",
                remote_name: "replyTo",
                read: |m| Some(ParamValue::text(m.reply_to_name.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "reply_to_email",
                remote_name: "replyToEmail",
                read: |m| Some(ParamValue::text(m.reply_to_email.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "to",
                remote_name: "to",
                read: |m| Some(ParamValue::text(m.to.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "message_type",
                remote_name: "type",
                read: |m| Some(ParamValue::text(m.message_type.as_str())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "hotmail_unsub_flag",
                remote_name: "hotmailUnsubUrl",
                read: |m| Some(ParamValue::Flag(m.hotmail_unsub_flag)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "is_bounceback",
                remote_name: "isBounceback",
                read: |m| Some(ParamValue::Flag(m.is_bounceback)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "body",
                remote_name: "body",
                read: |m| Some(ParamValue::text(m.body.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "created_at",
                remote_name: "createDate",
                read: |m| Some(ParamValue::Timestamp(m.created_at)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
        ];
        SPECS
    }
}

/// Lightweight reference to a message, carrying the remote id snapshot
/// needed to serialize foreign references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: MessageId,
    pub remote_id: Option<RemoteId>,
}

impl MessageRef {
    /// Reference to a not-yet-synchronized message
    pub fn new(id: MessageId) -> Self {
        Self { id, remote_id: None }
    }

    /// Reference to a synchronized message
    pub fn synced(id: MessageId, remote_id: RemoteId) -> Self {
        Self { id, remote_id: Some(remote_id) }
    }

    /// The referenced message's remote id, or a mapping error naming the
    /// field when the message has not been synchronized yet
    pub fn require_remote_id(
        &self,
        entity: &'static str,
        field: &'static str,
    ) -> Result<RemoteId, MappingError> {
        self.remote_id
            .ok_or(MappingError::missing_reference(entity, field))
    }
}

impl From<&Message> for MessageRef {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            remote_id: message.remote_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::mapping::build_request;

    #[test]
    fn test_message_creation() {
        let message = Message::new("Name", "Subject", "[FIELD]EMAIL[/FIELD]", "Body")
            .with_from("My site", "mysite@mail.com");

        assert_eq!(message.encoding, "UTF-8");
        assert_eq!(message.message_type, MessageType::Email);
        assert!(message.hotmail_unsub_flag);
        assert!(!message.is_synchronized());
    }

    #[test]
    fn test_unsynchronized_message_omits_id() {
        let message = Message::new("Name", "Subject", "to", "Body");
        let request = build_request(&message).unwrap();

        assert!(!request.contains("id"));
        assert_eq!(request.get("name"), Some(&ParamValue::text("Name")));
    }

    #[test]
    fn test_synchronized_message_sends_remote_id() {
        let mut message = Message::new("Name", "Subject", "to", "Body");
        message.remote_id = Some(RemoteId::new(1234));
        let request = build_request(&message).unwrap();

        assert_eq!(request.get("id"), Some(&ParamValue::Id(RemoteId::new(1234))));
    }
}

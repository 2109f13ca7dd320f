//! Campaigns - the assembly of what will be sent
//!
//! A campaign ties one message to one segment plus delivery settings.
//! Both references serialize as the referenced entity's remote identifier
//! (`messageId`, `mailinglistId`); local foreign keys never leave the
//! system. Once created remotely, a campaign can be posted to start
//! processing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::identifiers::CampaignId;
use core_kernel::mapping::{DefaultPolicy, FieldSpec, RemoteObject, Resolved};
use core_kernel::remote::{ParamValue, RemoteId};

use crate::message::MessageRef;
use crate::segment::SegmentRef;

/// Default send time: five minutes from now
fn five_minutes_ahead() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(5)
}

/// A campaign to be dispatched by the remote platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Local identifier (never sent remotely)
    pub id: CampaignId,
    /// Remote identifier, present only after a successful remote create
    pub remote_id: Option<RemoteId>,
    /// Campaign name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Whether analytics tracking is enabled
    pub analytics: bool,
    /// Delivery speed setting
    pub deliver_speed: i64,
    /// Deduplicate recipient emails when sending
    pub dedup_email: bool,
    /// Platform life status
    pub life_status: Option<String>,
    /// Notify on campaign progress
    pub notify_progress: bool,
    /// Post-click tracking
    pub post_click_tracking: bool,
    /// When to send the campaign
    pub send_at: DateTime<Utc>,
    /// Platform status
    pub status: Option<String>,
    /// Platform strategy
    pub strategy: Option<String>,
    /// Platform target
    pub target: Option<String>,
    /// Where to redirect when the campaign expires
    pub url_end_campaign: String,
    /// Platform validity state
    pub valid: Option<String>,
    /// Platform format
    pub format: Option<String>,
    /// URL host override
    pub url_host: Option<String>,
    /// Additional segment id list
    pub segment_ids: Option<String>,
    /// The recipient segment
    pub segment: SegmentRef,
    /// The message to send
    pub message: MessageRef,
}

impl Campaign {
    /// Creates a new unsynchronized campaign for a message and segment
    pub fn new(
        name: impl Into<String>,
        url_end_campaign: impl Into<String>,
        message: MessageRef,
        segment: SegmentRef,
    ) -> Self {
        Self {
            id: CampaignId::new_v7(),
            remote_id: None,
            name: name.into(),
            description: None,
            analytics: false,
            deliver_speed: 0,
            dedup_email: true,
            life_status: None,
            notify_progress: true,
            post_click_tracking: false,
            send_at: five_minutes_ahead(),
            status: None,
            strategy: None,
            target: None,
            url_end_campaign: url_end_campaign.into(),
            valid: None,
            format: None,
            url_host: None,
            segment_ids: None,
            segment,
            message,
        }
    }

    /// Sets the send time
    pub fn with_send_at(mut self, send_at: DateTime<Utc>) -> Self {
        self.send_at = send_at;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// True once the campaign has a remote counterpart
    pub fn is_synchronized(&self) -> bool {
        self.remote_id.is_some()
    }
}

impl RemoteObject for Campaign {
    const OBJECT_NAME: &'static str = "apiCampaign";

    fn field_specs() -> &'static [FieldSpec<Self>] {
        static SPECS: &[FieldSpec<Campaign>] = &[
            FieldSpec {
                local_name: "remote_id",
                remote_name: "id",
                read: |c| c.remote_id.map(ParamValue::Id),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "name",
                remote_name: "name",
                read: |c| Some(ParamValue::text(c.name.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "description",
                remote_name: "description",
                read: |c| c.description.clone().map(ParamValue::Text),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "analytics",
                remote_name: "analytics",
                read: |c| Some(ParamValue::Flag(c.analytics)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "deliver_speed",
                remote_name: "deliverySpeed",
                read: |c| Some(ParamValue::Int(c.deliver_speed)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "dedup_email",
                remote_name: "emaildedupflg",
                read: |c| Some(ParamValue::Flag(c.dedup_email)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "life_status",
                remote_name: "lifeStatus",
                read: |c| c.life_status.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "notify_progress",
                remote_name: "notification",
                read: |c| Some(ParamValue::Flag(c.notify_progress)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "post_click_tracking",
                remote_name: "postClickTracking",
                read: |c| Some(ParamValue::Flag(c.post_click_tracking)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "send_at",
                remote_name: "sendDate",
                read: |c| Some(ParamValue::Timestamp(c.send_at)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "status",
                remote_name: "status",
                read: |c| c.status.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "strategy",
                remote_name: "strategy",
                read: |c| c.strategy.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "target",
                remote_name: "target",
                read: |c| c.target.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "url_end_campaign",
                remote_name: "urlEndCampaign",
                read: |c| Some(ParamValue::text(c.url_end_campaign.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "valid",
                remote_name: "valid",
                read: |c| c.valid.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "format",
                remote_name: "format",
                read: |c| c.format.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "url_host",
                remote_name: "urlHost",
                read: |c| c.url_host.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "segment_ids",
                remote_name: "segmentIds",
                read: |c| c.segment_ids.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "segment",
                remote_name: "mailinglistId",
                read: |_| None,
                default: DefaultPolicy::Omit,
                override_with: Some(|_, c| {
                    let remote_id = c.segment.require_remote_id("Campaign", "segment")?;
                    Ok(Resolved::Value(ParamValue::Id(remote_id)))
                }),
            },
            FieldSpec {
                local_name: "message",
                remote_name: "messageId",
                read: |_| None,
                default: DefaultPolicy::Omit,
                override_with: Some(|_, c| {
                    let remote_id = c.message.require_remote_id("Campaign", "message")?;
                    Ok(Resolved::Value(ParamValue::Id(remote_id)))
                }),
            },
        ];
        SPECS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::identifiers::{MessageId, SegmentId};
    use core_kernel::mapping::build_request;

    fn synced_refs() -> (MessageRef, SegmentRef) {
        (
            MessageRef::synced(MessageId::new(), RemoteId::new(11)),
            SegmentRef::synced(SegmentId::new(), RemoteId::new(22)),
        )
    }

    #[test]
    fn test_references_serialize_remote_ids() {
        let (message, segment) = synced_refs();
        let campaign = Campaign::new("My Campaign", "http://end/", message, segment);
        let request = build_request(&campaign).unwrap();

        assert_eq!(request.get("messageId"), Some(&ParamValue::Id(RemoteId::new(11))));
        assert_eq!(request.get("mailinglistId"), Some(&ParamValue::Id(RemoteId::new(22))));
        // Local identifiers never appear on the request
        assert!(!request.contains("segment"));
        assert!(!request.contains("message"));
    }

    #[test]
    fn test_absent_platform_fields_are_omitted() {
        let (message, segment) = synced_refs();
        let campaign = Campaign::new("My Campaign", "http://end/", message, segment);
        let request = build_request(&campaign).unwrap();

        for attr in ["id", "status", "strategy", "target", "valid", "format", "urlHost", "segmentIds", "lifeStatus"] {
            assert!(!request.contains(attr), "{attr} should be omitted");
        }
    }

    #[test]
    fn test_absent_description_becomes_empty_string() {
        let (message, segment) = synced_refs();
        let campaign = Campaign::new("My Campaign", "http://end/", message, segment);
        let request = build_request(&campaign).unwrap();

        assert_eq!(request.get("description"), Some(&ParamValue::empty()));
    }

    #[test]
    fn test_flags_serialize_as_integers() {
        let (message, segment) = synced_refs();
        let campaign = Campaign::new("My Campaign", "http://end/", message, segment);
        let json = build_request(&campaign).unwrap().to_json();

        assert_eq!(json["emaildedupflg"], serde_json::json!(1));
        assert_eq!(json["analytics"], serde_json::json!(0));
        assert_eq!(json["notification"], serde_json::json!(1));
    }
}

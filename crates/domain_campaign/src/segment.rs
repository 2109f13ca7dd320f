//! Segments - recipient selections
//!
//! A segment is a set of criteria used to select records in the member
//! database; a campaign targets exactly one segment.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::identifiers::SegmentId;
use core_kernel::mapping::{DefaultPolicy, FieldSpec, MappingError, RemoteObject};
use core_kernel::remote::{ParamValue, RemoteId};

/// How the sample rate is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SampleType {
    /// The whole segment
    All,
    /// A percentage of the segment
    Percent,
    /// A fixed number of members
    Fix,
}

impl SampleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::All => "ALL",
            SampleType::Percent => "PERCENT",
            SampleType::Fix => "FIX",
        }
    }
}

/// A recipient segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Local identifier
    pub id: SegmentId,
    /// Remote identifier, present only after a successful remote create
    pub remote_id: Option<RemoteId>,
    /// Segment name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Percentage or number of members sampled from the segment
    pub sample_rate: Option<Decimal>,
    /// Sampling interpretation
    pub sample_type: SampleType,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl Segment {
    /// Creates a new unsynchronized segment
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SegmentId::new_v7(),
            remote_id: None,
            name: name.into(),
            description: String::new(),
            sample_rate: None,
            sample_type: SampleType::All,
            created_at: now,
            modified_at: now,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the sampling rate and type
    pub fn with_sampling(mut self, rate: Decimal, sample_type: SampleType) -> Self {
        self.sample_rate = Some(rate);
        self.sample_type = sample_type;
        self
    }

    /// True once the segment has a remote counterpart
    pub fn is_synchronized(&self) -> bool {
        self.remote_id.is_some()
    }
}

impl RemoteObject for Segment {
    const OBJECT_NAME: &'static str = "apiSegmentation";

    fn field_specs() -> &'static [FieldSpec<Self>] {
        static SPECS: &[FieldSpec<Segment>] = &[
            FieldSpec {
                local_name: "remote_id",
                remote_name: "id",
                read: |s| s.remote_id.map(ParamValue::Id),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "name",
                remote_name: "name",
                read: |s| Some(ParamValue::text(s.name.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "description",
                remote_name: "description",
                read: |s| Some(ParamValue::text(s.description.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "sample_rate",
                remote_name: "sampleRate",
                read: |s| s.sample_rate.map(ParamValue::Decimal),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "sample_type",
                remote_name: "sampleType",
                read: |s| Some(ParamValue::text(s.sample_type.as_str())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "created_at",
                remote_name: "dateCreate",
                read: |s| Some(ParamValue::Timestamp(s.created_at)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "modified_at",
                remote_name: "dateModif",
                read: |s| Some(ParamValue::Timestamp(s.modified_at)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
        ];
        SPECS
    }
}

/// Lightweight reference to a segment, carrying the remote id snapshot
/// needed to serialize foreign references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRef {
    pub id: SegmentId,
    pub remote_id: Option<RemoteId>,
}

impl SegmentRef {
    /// Reference to a not-yet-synchronized segment
    pub fn new(id: SegmentId) -> Self {
        Self { id, remote_id: None }
    }

    /// Reference to a synchronized segment
    pub fn synced(id: SegmentId, remote_id: RemoteId) -> Self {
        Self { id, remote_id: Some(remote_id) }
    }

    /// The referenced segment's remote id, or a mapping error naming the
    /// field when the segment has not been synchronized yet
    pub fn require_remote_id(
        &self,
        entity: &'static str,
        field: &'static str,
    ) -> Result<RemoteId, MappingError> {
        self.remote_id
            .ok_or(MappingError::missing_reference(entity, field))
    }
}

impl From<&Segment> for SegmentRef {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id,
            remote_id: segment.remote_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::mapping::build_request;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sample_rate_omitted_when_absent() {
        let segment = Segment::new("My segment");
        let request = build_request(&segment).unwrap();

        assert!(!request.contains("sampleRate"));
        assert_eq!(request.get("sampleType"), Some(&ParamValue::text("ALL")));
    }

    #[test]
    fn test_sample_rate_sent_when_set() {
        let segment = Segment::new("My segment").with_sampling(dec!(12.5), SampleType::Percent);
        let request = build_request(&segment).unwrap();

        assert_eq!(request.get("sampleRate"), Some(&ParamValue::Decimal(dec!(12.5))));
        assert_eq!(request.get("sampleType"), Some(&ParamValue::text("PERCENT")));
    }
}

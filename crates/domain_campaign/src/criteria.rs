//! Segment selection criteria
//!
//! Criteria select records in the member database for a segment. String
//! criteria compare a column against a list of values; numeric criteria
//! compare against one value or a range. Both serialize their segment
//! reference as the segment's *remote* identifier under the `id`
//! attribute, never the local foreign key.

use serde::{Deserialize, Serialize};

use core_kernel::identifiers::{CriteriaId, NumericCriteriaId};
use core_kernel::mapping::{DefaultPolicy, FieldSpec, RemoteObject, Resolved};
use core_kernel::remote::ParamValue;

use crate::segment::SegmentRef;

/// A string (alphanumeric/date) demographic criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    /// Local identifier
    pub id: CriteriaId,
    /// Name of the criteria group, when grouped and named
    pub group_name: Option<String>,
    /// Fragment ordering inside the group
    pub order_frag: Option<i64>,
    /// Group id; takes priority over the group name
    pub group_number: Option<i64>,
    /// Member database column the criteria applies to
    pub column_name: String,
    /// Comparison operator
    pub operator: String,
    /// Values the operator compares the column against
    pub values: Vec<String>,
    /// The segment this criteria belongs to
    pub segment: SegmentRef,
}

impl Criteria {
    /// Creates a new criteria for a segment
    pub fn new(
        column_name: impl Into<String>,
        operator: impl Into<String>,
        values: Vec<String>,
        segment: SegmentRef,
    ) -> Self {
        Self {
            id: CriteriaId::new_v7(),
            group_name: None,
            order_frag: None,
            group_number: None,
            column_name: column_name.into(),
            operator: operator.into(),
            values,
            segment,
        }
    }

    /// Assigns the criteria to a named group
    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = Some(name.into());
        self
    }

    /// Assigns the criteria to a numbered group
    pub fn with_group_number(mut self, number: i64) -> Self {
        self.group_number = Some(number);
        self
    }
}

impl RemoteObject for Criteria {
    const OBJECT_NAME: &'static str = "apiStringDemographicCriteria";

    fn field_specs() -> &'static [FieldSpec<Self>] {
        static SPECS: &[FieldSpec<Criteria>] = &[
            FieldSpec {
                local_name: "group_name",
                remote_name: "groupName",
                read: |c| c.group_name.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "order_frag",
                remote_name: "orderFrag",
                read: |c| c.order_frag.map(ParamValue::Int),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "group_number",
                remote_name: "groupNumber",
                read: |c| c.group_number.map(ParamValue::Int),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "column_name",
                remote_name: "columnName",
                read: |c| Some(ParamValue::text(c.column_name.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "operator",
                remote_name: "operator",
                read: |c| Some(ParamValue::text(c.operator.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "values",
                remote_name: "values",
                read: |c| Some(ParamValue::TextList(c.values.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "segment",
                remote_name: "id",
                read: |_| None,
                default: DefaultPolicy::Omit,
                override_with: Some(|_, c| {
                    let remote_id = c.segment.require_remote_id("Criteria", "segment")?;
                    Ok(Resolved::Value(ParamValue::Id(remote_id)))
                }),
            },
        ];
        SPECS
    }
}

/// A numeric demographic criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericCriteria {
    /// Local identifier
    pub id: NumericCriteriaId,
    /// Name of the criteria group, when grouped and named
    pub group_name: Option<String>,
    /// Fragment ordering inside the group
    pub order_frag: Option<i64>,
    /// Group id; takes priority over the group name
    pub group_number: Option<i64>,
    /// Member database column the criteria applies to
    pub column_name: String,
    /// Comparison operator
    pub operator: String,
    /// First (or only) comparison value
    pub first_value: i64,
    /// Second comparison value for range operators
    pub second_value: Option<i64>,
    /// The segment this criteria belongs to
    pub segment: SegmentRef,
}

impl NumericCriteria {
    /// Creates a new numeric criteria for a segment
    pub fn new(
        column_name: impl Into<String>,
        operator: impl Into<String>,
        first_value: i64,
        segment: SegmentRef,
    ) -> Self {
        Self {
            id: NumericCriteriaId::new_v7(),
            group_name: None,
            order_frag: None,
            group_number: None,
            column_name: column_name.into(),
            operator: operator.into(),
            first_value,
            second_value: None,
            segment,
        }
    }

    /// Sets the upper bound for range operators
    pub fn with_second_value(mut self, value: i64) -> Self {
        self.second_value = Some(value);
        self
    }
}

impl RemoteObject for NumericCriteria {
    const OBJECT_NAME: &'static str = "apiNumericDemographicCriteria";

    fn field_specs() -> &'static [FieldSpec<Self>] {
        static SPECS: &[FieldSpec<NumericCriteria>] = &[
            FieldSpec {
                local_name: "group_name",
                remote_name: "groupName",
                read: |c| c.group_name.clone().map(ParamValue::Text),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "order_frag",
                remote_name: "orderFrag",
                read: |c| c.order_frag.map(ParamValue::Int),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "group_number",
                remote_name: "groupNumber",
                read: |c| c.group_number.map(ParamValue::Int),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "column_name",
                remote_name: "columnName",
                read: |c| Some(ParamValue::text(c.column_name.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "operator",
                remote_name: "operator",
                read: |c| Some(ParamValue::text(c.operator.clone())),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "first_value",
                remote_name: "firstValue",
                read: |c| Some(ParamValue::Int(c.first_value)),
                default: DefaultPolicy::EmptyText,
                override_with: None,
            },
            FieldSpec {
                local_name: "second_value",
                remote_name: "secondValue",
                read: |c| c.second_value.map(ParamValue::Int),
                default: DefaultPolicy::Omit,
                override_with: None,
            },
            FieldSpec {
                local_name: "segment",
                remote_name: "id",
                read: |_| None,
                default: DefaultPolicy::Omit,
                override_with: Some(|_, c| {
                    let remote_id = c.segment.require_remote_id("NumericCriteria", "segment")?;
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
    use core_kernel::identifiers::SegmentId;
    use core_kernel::mapping::{build_request, MappingError};
    use core_kernel::remote::RemoteId;

    fn synced_segment() -> SegmentRef {
        SegmentRef::synced(SegmentId::new(), RemoteId::new(88))
    }

    #[test]
    fn test_segment_reference_serializes_remote_id() {
        let criteria = Criteria::new(
            "EMAIL",
            "EQUALS",
            vec!["email1@mail.com".into(), "email2@mail.com".into()],
            synced_segment(),
        );
        let request = build_request(&criteria).unwrap();

        assert_eq!(request.get("id"), Some(&ParamValue::Id(RemoteId::new(88))));
        assert_eq!(request.object(), "apiStringDemographicCriteria");
    }

    #[test]
    fn test_unsynchronized_segment_reference_fails() {
        let criteria = Criteria::new(
            "EMAIL",
            "EQUALS",
            vec![],
            SegmentRef::new(SegmentId::new()),
        );

        let error = build_request(&criteria).unwrap_err();
        assert!(matches!(
            error,
            MappingError::MissingRemoteReference { entity: "Criteria", field: "segment" }
        ));
    }

    #[test]
    fn test_group_fields_omitted_by_default() {
        let criteria = NumericCriteria::new("IS_ACTIVE", "EQUALS", 1, synced_segment());
        let request = build_request(&criteria).unwrap();

        assert!(!request.contains("groupName"));
        assert!(!request.contains("groupNumber"));
        assert!(!request.contains("orderFrag"));
        assert!(!request.contains("secondValue"));
        assert_eq!(request.get("firstValue"), Some(&ParamValue::Int(1)));
    }
}

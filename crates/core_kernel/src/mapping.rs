//! Declarative field mapping
//!
//! Each entity that synchronizes with the remote platform declares a static
//! table of [`FieldSpec`] descriptors: how to read the local value, the
//! attribute name on the remote object, what to substitute when the local
//! value is absent, and an optional override for fields that must serialize
//! something other than the plain value (foreign references send the
//! referenced entity's remote identifier).
//!
//! [`build_request`] consumes a descriptor table and produces the
//! [`RemoteRequest`] for one remote call. Identity fields never appear in
//! the tables, so a built request never contains an attribute the remote
//! schema does not define.

use thiserror::Error;

use crate::remote::{ParamValue, RemoteRequest};

/// Errors produced while mapping an entity to a remote request
///
/// A mapping error indicates a mis-declared schema or an entity used out of
/// lifecycle order (e.g. serializing a reference to an entity that has not
/// been synchronized yet). It is not an I/O condition and is never retried.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A foreign reference field points at an entity without a remote id
    #[error("{entity}.{field} references an entity that has no remote id yet")]
    MissingRemoteReference {
        entity: &'static str,
        field: &'static str,
    },
}

impl MappingError {
    /// Creates a missing-reference error for the given entity field
    pub fn missing_reference(entity: &'static str, field: &'static str) -> Self {
        MappingError::MissingRemoteReference { entity, field }
    }
}

/// The outcome of resolving one field
///
/// `Omit` is the tagged replacement for an in-band "delete this attribute"
/// sentinel: it marks "leave this attribute off the request entirely",
/// which is distinct from sending an empty or null value.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Set the attribute to this value
    Value(ParamValue),
    /// Leave the attribute off the request entirely
    Omit,
}

/// What to substitute when the local field value is absent
pub enum DefaultPolicy<E: ?Sized> {
    /// Substitute an empty string (the fallback for fields with no policy)
    EmptyText,
    /// Omit the attribute from the request
    Omit,
    /// Compute a substitute from the in-progress request and the entity
    Compute(fn(&RemoteRequest, &E) -> Resolved),
}

/// Override function for fields whose serialized value is derived rather
/// than read directly (foreign references)
pub type OverrideFn<E> = fn(&RemoteRequest, &E) -> Result<Resolved, MappingError>;

/// Descriptor for one mapped field of an entity
pub struct FieldSpec<E: ?Sized> {
    /// Local field name, for diagnostics
    pub local_name: &'static str,
    /// Attribute name on the remote object
    pub remote_name: &'static str,
    /// Reads the local value; `None` means the value is absent
    pub read: fn(&E) -> Option<ParamValue>,
    /// Substitution policy when the local value is absent
    pub default: DefaultPolicy<E>,
    /// Replaces the plain value whenever declared. Reference fields are
    /// locally non-nullable, so the override always applies for them.
    pub override_with: Option<OverrideFn<E>>,
}

/// An entity type that maps onto a named remote object
pub trait RemoteObject {
    /// The remote object name instantiated for this entity (e.g. `apiMessage`)
    const OBJECT_NAME: &'static str;

    /// The ordered field descriptor table, excluding identity fields
    fn field_specs() -> &'static [FieldSpec<Self>];
}

/// Builds the remote request object for one entity instance
///
/// Resolution per field: an absent local value resolves through the
/// default policy (empty string when none is declared); a present value
/// passes through unless an override is declared; a field resolving to
/// [`Resolved::Omit`] is removed from the request entirely. Every
/// non-omitted field ends up on the request, even if empty.
pub fn build_request<E: RemoteObject + 'static>(entity: &E) -> Result<RemoteRequest, MappingError> {
    let mut request = RemoteRequest::new(E::OBJECT_NAME);

    for spec in E::field_specs() {
        let resolved = match &spec.override_with {
            Some(override_fn) => override_fn(&request, entity)?,
            None => match (spec.read)(entity) {
                Some(value) => Resolved::Value(value),
                None => match &spec.default {
                    DefaultPolicy::EmptyText => Resolved::Value(ParamValue::empty()),
                    DefaultPolicy::Omit => Resolved::Omit,
                    DefaultPolicy::Compute(compute) => compute(&request, entity),
                },
            },
        };

        match resolved {
            Resolved::Value(value) => request.set(spec.remote_name, value),
            Resolved::Omit => request.clear(spec.remote_name),
        }
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        label: Option<String>,
        count: Option<i64>,
        enabled: bool,
    }

    impl RemoteObject for Widget {
        const OBJECT_NAME: &'static str = "apiWidget";

        fn field_specs() -> &'static [FieldSpec<Self>] {
            static SPECS: &[FieldSpec<Widget>] = &[
                FieldSpec {
                    local_name: "label",
                    remote_name: "label",
                    read: |w| w.label.clone().map(ParamValue::Text),
                    default: DefaultPolicy::EmptyText,
                    override_with: None,
                },
                FieldSpec {
                    local_name: "count",
                    remote_name: "itemCount",
                    read: |w| w.count.map(ParamValue::Int),
                    default: DefaultPolicy::Omit,
                    override_with: None,
                },
                FieldSpec {
                    local_name: "enabled",
                    remote_name: "enabled",
                    read: |w| Some(ParamValue::Flag(w.enabled)),
                    default: DefaultPolicy::EmptyText,
                    override_with: None,
                },
            ];
            SPECS
        }
    }

    #[test]
    fn test_absent_value_without_policy_becomes_empty_string() {
        let widget = Widget { label: None, count: Some(3), enabled: true };
        let request = build_request(&widget).unwrap();
        assert_eq!(request.get("label"), Some(&ParamValue::empty()));
    }

    #[test]
    fn test_omit_policy_removes_attribute_entirely() {
        let widget = Widget { label: Some("a".into()), count: None, enabled: false };
        let request = build_request(&widget).unwrap();

        assert!(!request.contains("itemCount"));
        // Omitted is not the same as present-but-empty
        assert_ne!(request.get("itemCount"), Some(&ParamValue::empty()));
    }

    #[test]
    fn test_present_values_pass_through_with_remote_names() {
        let widget = Widget { label: Some("a".into()), count: Some(9), enabled: true };
        let request = build_request(&widget).unwrap();

        assert_eq!(request.object(), "apiWidget");
        assert_eq!(request.get("itemCount"), Some(&ParamValue::Int(9)));
        assert_eq!(request.get("enabled"), Some(&ParamValue::Flag(true)));
    }
}

//! Remote value model
//!
//! Types describing what the remote platform understands: platform-assigned
//! identifiers, attribute values in the remote wire vocabulary, and the
//! request object a mapped entity produces.
//!
//! The remote schema uses integer-flag semantics for booleans, so flags
//! always serialize as `1`/`0`, and timestamps are transmitted as
//! `YYYY-MM-DDTHH:MM:SS` without an offset.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp format used on the wire for all remote date attributes
pub const REMOTE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// An identifier assigned by the remote platform
///
/// Remote identity and local identity are distinct namespaces. A
/// `RemoteId` exists on a local record only after a successful remote
/// create call has returned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(i64);

impl RemoteId {
    /// Wraps a raw platform identifier
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RemoteId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<RemoteId> for i64 {
    fn from(id: RemoteId) -> i64 {
        id.0
    }
}

/// A key/value entry in a flattened remote collection attribute
///
/// Used by member synchronization (`dynContent`) and transactional
/// notifications (`dyn`, `content`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single attribute value in a remote request
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Plain text attribute; absent local values serialize as ""
    Text(String),
    /// Integer attribute
    Int(i64),
    /// Decimal attribute (sample rates and the like)
    Decimal(Decimal),
    /// Boolean attribute; transmitted as `1`/`0`, never `true`/`false`
    Flag(bool),
    /// Timestamp attribute; transmitted as `YYYY-MM-DDTHH:MM:SS`
    Timestamp(DateTime<Utc>),
    /// List-of-strings attribute
    TextList(Vec<String>),
    /// Flattened key/value entry list
    Entries(Vec<KeyValue>),
    /// A remote identifier (for serialized foreign references)
    Id(RemoteId),
}

impl ParamValue {
    /// Convenience constructor for text values
    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::Text(value.into())
    }

    /// The empty-string value substituted for absent fields with no policy
    pub fn empty() -> Self {
        ParamValue::Text(String::new())
    }
}

impl Serialize for ParamValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ParamValue::Text(s) => serializer.serialize_str(s),
            ParamValue::Int(i) => serializer.serialize_i64(*i),
            ParamValue::Decimal(d) => serializer.serialize_str(&d.to_string()),
            ParamValue::Flag(b) => serializer.serialize_u8(u8::from(*b)),
            ParamValue::Timestamp(ts) => {
                serializer.serialize_str(&ts.format(REMOTE_TIMESTAMP_FORMAT).to_string())
            }
            ParamValue::TextList(items) => items.serialize(serializer),
            ParamValue::Entries(entries) => {
                let mut state = serializer.serialize_struct("entries", 1)?;
                state.serialize_field("entry", entries)?;
                state.end()
            }
            ParamValue::Id(id) => serializer.serialize_i64(id.value()),
        }
    }
}

/// The in-progress request object built for one remote call
///
/// Holds the remote object name (e.g. `apiMessage`) and the attributes
/// resolved so far. An attribute that resolved to
/// [`Resolved::Omit`](crate::mapping::Resolved) is removed entirely,
/// which is distinct from an attribute carrying an empty string: some
/// remote operations reject requests that carry an unknown-but-null
/// attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    object: &'static str,
    attrs: BTreeMap<String, ParamValue>,
}

impl RemoteRequest {
    /// Creates an empty request for the named remote object
    pub fn new(object: &'static str) -> Self {
        Self {
            object,
            attrs: BTreeMap::new(),
        }
    }

    /// The remote object name this request instantiates
    pub fn object(&self) -> &'static str {
        self.object
    }

    /// Sets an attribute, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: ParamValue) {
        self.attrs.insert(name.into(), value);
    }

    /// Removes an attribute so it is absent from the serialized request
    pub fn clear(&mut self, name: &str) {
        self.attrs.remove(name);
    }

    /// Returns the attribute value, if present
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.attrs.get(name)
    }

    /// True when the attribute is present on the request
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Number of attributes currently set
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// True when no attributes are set
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterates attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Serializes the attribute map to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for RemoteRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.attrs.len()))?;
        for (name, value) in &self.attrs {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flag_serializes_as_integer() {
        assert_eq!(serde_json::to_value(ParamValue::Flag(true)).unwrap(), serde_json::json!(1));
        assert_eq!(serde_json::to_value(ParamValue::Flag(false)).unwrap(), serde_json::json!(0));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
        let value = serde_json::to_value(ParamValue::Timestamp(ts)).unwrap();
        assert_eq!(value, serde_json::json!("2024-03-05T09:30:00"));
    }

    #[test]
    fn test_decimal_serializes_as_string() {
        let value = serde_json::to_value(ParamValue::Decimal(dec!(12.5))).unwrap();
        assert_eq!(value, serde_json::json!("12.5"));
    }

    #[test]
    fn test_entries_wrap_entry_list() {
        let entries = ParamValue::Entries(vec![KeyValue::new("EMAIL", "a@b.com")]);
        let value = serde_json::to_value(entries).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"entry": [{"key": "EMAIL", "value": "a@b.com"}]})
        );
    }

    #[test]
    fn test_request_clear_removes_attribute() {
        let mut request = RemoteRequest::new("apiMessage");
        request.set("id", ParamValue::Id(RemoteId::new(7)));
        request.set("name", ParamValue::text("Newsletter"));
        request.clear("id");

        assert!(!request.contains("id"));
        assert!(request.contains("name"));
        assert_eq!(request.len(), 1);
    }

    #[test]
    fn test_request_json_shape() {
        let mut request = RemoteRequest::new("apiCampaign");
        request.set("name", ParamValue::text("Spring"));
        request.set("notification", ParamValue::Flag(true));

        assert_eq!(
            request.to_json(),
            serde_json::json!({"name": "Spring", "notification": 1})
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_round_trips_unchanged(s in ".*") {
                let value = serde_json::to_value(ParamValue::text(s.clone())).unwrap();
                prop_assert_eq!(value, serde_json::json!(s));
            }

            #[test]
            fn int_round_trips_unchanged(n: i64) {
                let value = serde_json::to_value(ParamValue::Int(n)).unwrap();
                prop_assert_eq!(value, serde_json::json!(n));
            }

            #[test]
            fn timestamp_always_matches_wire_format(secs in 0i64..4_102_444_800) {
                let ts = chrono::DateTime::from_timestamp(secs, 0).unwrap();
                let value = serde_json::to_value(ParamValue::Timestamp(ts)).unwrap();
                let rendered = value.as_str().unwrap();
                prop_assert_eq!(rendered.len(), 19);
                prop_assert_eq!(rendered, ts.format(REMOTE_TIMESTAMP_FORMAT).to_string());
            }

            #[test]
            fn set_then_get_returns_the_value(name in "[a-zA-Z]{1,16}", n: i64) {
                let mut request = RemoteRequest::new("apiMessage");
                request.set(name.clone(), ParamValue::Int(n));
                prop_assert_eq!(request.get(&name), Some(&ParamValue::Int(n)));
            }
        }
    }
}

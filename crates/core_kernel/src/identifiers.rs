//! Strongly-typed identifiers for local entities
//!
//! Using newtype wrappers around UUIDs provides type safety and prevents
//! accidental mixing of different identifier types. Local identifiers are
//! never sent to the remote platform; remote identity is a separate
//! namespace (see [`crate::remote::RemoteId`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Campaign domain identifiers
define_id!(MessageId, "MSG");
define_id!(LinkId, "LNK");
define_id!(SegmentId, "SEG");
define_id!(CriteriaId, "CRI");
define_id!(NumericCriteriaId, "NCR");
define_id!(CampaignId, "CMP");

// Member domain identifiers
define_id!(MemberId, "MBR");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_display() {
        let id = MessageId::new();
        let display = id.to_string();
        assert!(display.starts_with("MSG-"));
    }

    #[test]
    fn test_id_parsing() {
        let original = CampaignId::new();
        let parsed: CampaignId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let segment_id = SegmentId::from(uuid);
        let back: Uuid = segment_id.into();
        assert_eq!(uuid, back);
    }
}

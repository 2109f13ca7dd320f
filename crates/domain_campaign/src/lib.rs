//! Campaign domain
//!
//! Local entities for the campaign-marketing side of the system (messages,
//! links, segments, selection criteria, campaigns), their declarative
//! remote field mappings, and the [`CampaignPlatform`] port through which
//! they reach the remote platform.

pub mod campaign;
pub mod criteria;
pub mod error;
pub mod link;
pub mod message;
pub mod ports;
pub mod segment;

pub use campaign::Campaign;
pub use criteria::{Criteria, NumericCriteria};
pub use error::CampaignError;
pub use link::{Link, LinkKind};
pub use message::{Message, MessageRef, MessageType};
pub use ports::CampaignPlatform;
pub use segment::{Segment, SegmentRef, SampleType};

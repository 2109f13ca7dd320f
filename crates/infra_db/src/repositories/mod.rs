//! Repository implementations
//!
//! Each repository pairs local persistence with the matching remote
//! platform call. Saves run both inside one database transaction: the
//! remote call happens while the transaction is open, so a gateway
//! failure rolls the local write back.

pub mod campaign;
pub mod criteria;
pub mod link;
pub mod member;
pub mod message;
pub mod segment;

pub use campaign::CampaignRepository;
pub use criteria::CriteriaRepository;
pub use link::LinkRepository;
pub use member::MemberRepository;
pub use message::MessageRepository;
pub use segment::SegmentRepository;

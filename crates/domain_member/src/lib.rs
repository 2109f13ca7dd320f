//! Member domain
//!
//! Members are the users registered in the local database and mirrored in
//! the remote member database. Unlike campaign entities they carry no
//! remote identifier: the platform keys them by email. This crate also
//! builds transactional-notification requests, which reach the platform's
//! notification service rather than the member database.

pub mod error;
pub mod member;
pub mod notification;
pub mod ports;

pub use error::MemberError;
pub use member::Member;
pub use notification::Notification;
pub use ports::MemberPlatform;

//! Database layer
//!
//! PostgreSQL persistence for campaign and member entities via SQLx,
//! following the repository pattern. Repositories take the remote
//! platform port as an argument, so the same code path serves production
//! gateways and test doubles.
//!
//! # Synchronized writes
//!
//! Local state mirrors the remote platform. A save opens a transaction,
//! upserts the local row, performs the remote create, records the
//! platform-assigned identifier, and only then commits. Every failure
//! before the commit rolls the local write back, so a row with a
//! remote id always refers to an object that exists on the platform.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::{DatabaseError, SyncError};
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use repositories::{
    CampaignRepository, CriteriaRepository, LinkRepository, MemberRepository,
    MessageRepository, SegmentRepository,
};

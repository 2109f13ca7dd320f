//! Core Kernel - Foundational types for the campaign sync system
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed local identifiers
//! - The remote value model (remote identifiers, request attributes)
//! - The declarative field-mapping layer that turns local entities into
//!   remote request objects
//! - The shared gateway error taxonomy

pub mod identifiers;
pub mod mapping;
pub mod ports;
pub mod remote;

pub use identifiers::{
    CampaignId, CriteriaId, LinkId, MemberId, MessageId, NumericCriteriaId, SegmentId,
};
pub use mapping::{
    build_request, DefaultPolicy, FieldSpec, MappingError, RemoteObject, Resolved,
};
pub use ports::GatewayError;
pub use remote::{KeyValue, ParamValue, RemoteId, RemoteRequest, REMOTE_TIMESTAMP_FORMAT};

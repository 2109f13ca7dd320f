//! Test Utilities Crate
//!
//! Shared test infrastructure for the campaign sync test suite.
//!
//! # Modules
//!
//! - `builders`: Builder patterns for test entity construction
//! - `platform`: Recording double for the remote platform ports
//! - `database`: Database test helpers and container management

pub mod builders;
pub mod database;
pub mod platform;

pub use builders::*;
pub use database::*;
pub use platform::*;

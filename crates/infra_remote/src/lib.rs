//! Remote platform gateway
//!
//! Implements the campaign and member platform ports over the platform's
//! HTTP RPC services. Every authenticated call runs inside a short-lived
//! session: open a connection, invoke exactly one procedure, close the
//! connection regardless of the outcome. The notification service is the
//! exception; it accepts unauthenticated sends.

pub mod client;
pub mod config;
pub mod platform;
pub mod transport;

pub use client::RemoteRpcClient;
pub use config::RemoteConfig;
pub use platform::RemotePlatform;
pub use transport::{HttpTransport, RpcTransport};

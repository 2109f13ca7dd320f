//! Queue-driven sync worker
//!
//! Consumes job requests from a JetStream stream and executes them
//! against the local database and the remote campaign platform. Each job
//! names an operation and its arguments; acknowledgement is withheld
//! until the operation succeeds, so failed jobs are redelivered.

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod job;
pub mod report;

pub use api::{OperationError, OperationSurface, Operations};
pub use config::WorkerConfig;
pub use dispatcher::{process, route, Dispatcher, DispatcherError};
pub use job::{DispatchError, JobCall};
pub use report::{FailureReport, FailureReporter, LogFailureReporter, NatsFailureReporter};

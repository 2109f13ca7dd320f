//! Database error types

use thiserror::Error;

use core_kernel::mapping::MappingError;
use core_kernel::ports::GatewayError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A stored value could not be read back into its domain type
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{entity} with id {id}"))
    }

    /// Creates a corrupt row error for an unreadable stored value
    pub fn corrupt(column: &str, value: impl std::fmt::Display) -> Self {
        DatabaseError::CorruptRow(format!("{column} holds unknown value {value}"))
    }
}

/// Errors from a synchronized write
///
/// A synchronized write touches the local database and the remote
/// platform inside one unit of work. Any of the three layers can fail;
/// in every failure case the local transaction is rolled back.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Domain(#[from] domain_campaign::CampaignError),

    #[error(transparent)]
    Member(#[from] domain_member::MemberError),
}

impl From<sqlx::Error> for SyncError {
    fn from(error: sqlx::Error) -> Self {
        SyncError::Database(DatabaseError::SqlError(error))
    }
}

impl SyncError {
    /// True for failures a redelivered job may recover from
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Gateway(e) => e.is_transient(),
            SyncError::Database(DatabaseError::ConnectionFailed(_)) => true,
            SyncError::Database(DatabaseError::SqlError(sqlx::Error::PoolTimedOut)) => true,
            _ => false,
        }
    }
}

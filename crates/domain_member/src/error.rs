use thiserror::Error;

use core_kernel::mapping::MappingError;
use core_kernel::ports::GatewayError;

/// Errors produced by member operations
#[derive(Debug, Error)]
pub enum MemberError {
    #[error("member email must not be empty")]
    MissingEmail,

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

//! Campaign domain errors

use thiserror::Error;

use core_kernel::mapping::MappingError;
use core_kernel::ports::GatewayError;

/// Errors that can occur in the campaign domain
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("Link requires a target URL")]
    MissingUrl,

    #[error("Unsubscribe links require an error URL")]
    MissingErrorUrl,

    #[error("{0} has not been synchronized with the remote platform")]
    NotSynchronized(&'static str),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub mod changes;
pub mod models;

pub use changes::{ChangeRequestHandler, ReviewOutcome};
pub use models::{
    AvailabilityReport, ChangePayload, ChangeRequest, ChangeRequestStatus,
};

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Change request not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Catalog(#[from] unimart_catalog::CatalogError),
}

pub mod aggregate;
pub mod models;

pub use aggregate::{approved_only, average_of, ensure_first_review};
pub use models::{Review, MAX_RATING, MIN_RATING};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Reviewer already reviewed listing {listing}")]
    DuplicateReview { listing: String },
}

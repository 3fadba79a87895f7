pub mod activation;
pub mod models;

pub use activation::{ActivationOutcome, PromotionHandler};
pub use models::{Promotion, PromotionPackage, PromotionStatus};

#[derive(Debug, thiserror::Error)]
pub enum PromoError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Promotion not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

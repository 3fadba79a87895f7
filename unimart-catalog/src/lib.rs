pub mod lifecycle;
pub mod pricing;
pub mod product;

pub use lifecycle::{Lifecycle, ListingEdit};
pub use pricing::{compute_price, Quote};
pub use product::{
    Category, Condition, ImageSlots, Listing, NewProduct, NewService, PriceType, Product,
    ProductStatus, Service, ServiceStatus, MAX_IMAGE_SLOTS,
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

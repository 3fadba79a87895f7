pub mod identity;
pub mod listing;
pub mod models;
pub mod pii;

pub use identity::Principal;
pub use listing::{ListingKind, ListingRef};
pub use pii::Masked;

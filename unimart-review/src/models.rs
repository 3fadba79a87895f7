use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unimart_shared::ListingRef;
use uuid::Uuid;

use crate::ReviewError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A reviewer's rating and comment on exactly one listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub id: Uuid,
    pub listing: ListingRef,
    pub reviewer_id: Uuid,
    pub rating: u8,
    pub comment: String,
    pub is_verified_purchase: bool,
    /// Reviews publish immediately; admins may unapprove later.
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        listing: ListingRef,
        reviewer_id: Uuid,
        rating: u8,
        comment: String,
    ) -> Result<Self, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(ReviewError::Validation(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            listing,
            reviewer_id,
            rating,
            comment,
            is_verified_purchase: false,
            is_approved: true,
            created_at: Utc::now(),
        })
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unimart_shared::ListingRef;
use uuid::Uuid;

/// A purchasable featuring tier: flat price for a fixed number of days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromotionPackage {
    pub id: Uuid,
    pub name: String,
    pub duration_days: u32,
    pub price: Decimal,
    pub description: String,
    pub is_active: bool,
}

impl PromotionPackage {
    pub fn new(name: String, duration_days: u32, price: Decimal, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            duration_days,
            price,
            description,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionStatus {
    Pending,
    Active,
    Expired,
    Cancelled,
}

/// Paid featuring of one listing for a bounded window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promotion {
    pub id: Uuid,
    pub listing: ListingRef,
    pub package_id: Option<Uuid>,
    pub amount_paid: Decimal,
    pub status: PromotionStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Promotion {
    pub fn new(listing: ListingRef, package: &PromotionPackage) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing,
            package_id: Some(package.id),
            amount_paid: package.price,
            status: PromotionStatus::Pending,
            start_date: None,
            end_date: None,
            payment_reference: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PromotionStatus::Pending
    }
}

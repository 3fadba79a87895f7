use crate::listing::ListingRef;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Audit payloads logged when a mutation lands. These are serialized into
/// structured log lines, not published to a broker.

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListingCreatedEvent {
    pub listing: ListingRef,
    pub owner_id: Uuid,
    pub slug: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PriceChangedEvent {
    pub listing: ListingRef,
    pub vendor_price: Decimal,
    pub commission_rate: Decimal,
    pub price: Decimal,
    pub change_request_id: Option<Uuid>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct PromotionActivatedEvent {
    pub promotion_id: Uuid,
    pub listing: ListingRef,
    pub featured_until: Option<i64>,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReviewSubmittedEvent {
    pub review_id: Uuid,
    pub listing: ListingRef,
    pub reviewer_id: Uuid,
    pub rating: u8,
    pub timestamp: i64,
}

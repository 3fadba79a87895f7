use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unimart_catalog::{Product, MAX_IMAGE_SLOTS};
use uuid::Uuid;

use crate::ModerationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeRequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// The proposed edit, tagged by type. A request with no payload is
/// unrepresentable: price requests always carry the requested amount and
/// image requests a non-empty URL list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "request_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangePayload {
    Price {
        current_price: Decimal,
        requested_price: Decimal,
    },
    Images {
        new_images: Vec<String>,
    },
}

impl ChangePayload {
    pub fn kind(&self) -> &'static str {
        match self {
            ChangePayload::Price { .. } => "price",
            ChangePayload::Images { .. } => "images",
        }
    }
}

/// A seller-submitted edit to a product, queued for admin review.
///
/// Multiple pending requests of the same type may coexist; the workflow
/// does not deduplicate them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeRequest {
    pub id: Uuid,
    pub product_id: Uuid,
    pub requester_id: Uuid,
    pub payload: ChangePayload,
    pub reason: String,
    pub status: ChangeRequestStatus,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Both stamps stay null while the request is pending.
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

impl ChangeRequest {
    /// Open a price change request against a product.
    pub fn price(
        product: &Product,
        requester_id: Uuid,
        requested_price: Decimal,
        reason: String,
    ) -> Result<Self, ModerationError> {
        if requested_price < Decimal::ZERO {
            return Err(ModerationError::Validation(
                "requested price must be non-negative".into(),
            ));
        }
        Ok(Self::new(
            product.id,
            requester_id,
            ChangePayload::Price {
                current_price: product.vendor_price,
                requested_price,
            },
            reason,
        ))
    }

    /// Open an image change request. List length is validated here, not
    /// truncated at approval time.
    pub fn images(
        product: &Product,
        requester_id: Uuid,
        new_images: Vec<String>,
        reason: String,
    ) -> Result<Self, ModerationError> {
        if new_images.is_empty() {
            return Err(ModerationError::Validation(
                "an image change request needs at least one URL".into(),
            ));
        }
        if new_images.len() > MAX_IMAGE_SLOTS {
            return Err(ModerationError::Validation(format!(
                "at most {} images allowed, got {}",
                MAX_IMAGE_SLOTS,
                new_images.len()
            )));
        }
        Ok(Self::new(
            product.id,
            requester_id,
            ChangePayload::Images { new_images },
            reason,
        ))
    }

    fn new(product_id: Uuid, requester_id: Uuid, payload: ChangePayload, reason: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            requester_id,
            payload,
            reason,
            status: ChangeRequestStatus::Pending,
            admin_note: None,
            created_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChangeRequestStatus::Pending
    }
}

/// A buyer flagging a product as no longer available.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityReport {
    pub id: Uuid,
    pub product_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub is_resolved: bool,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl AvailabilityReport {
    pub fn new(product_id: Uuid, reporter_id: Uuid, reason: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            reporter_id,
            reason,
            is_resolved: false,
            admin_note: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }
}

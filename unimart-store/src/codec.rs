//! String forms of the domain enums as they live in the database.

use unimart_catalog::{Condition, PriceType, ProductStatus, ServiceStatus};
use unimart_moderation::ChangeRequestStatus;
use unimart_promo::PromotionStatus;
use unimart_shared::{ListingKind, ListingRef};
use uuid::Uuid;

use unimart_core::repository::RepoError;

fn unknown(kind: &str, value: &str) -> RepoError {
    format!("unknown {} value in database: {}", kind, value).into()
}

pub fn product_status_str(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Pending => "pending",
        ProductStatus::Active => "active",
        ProductStatus::Sold => "sold",
        ProductStatus::Inactive => "inactive",
    }
}

pub fn parse_product_status(value: &str) -> Result<ProductStatus, RepoError> {
    match value {
        "pending" => Ok(ProductStatus::Pending),
        "active" => Ok(ProductStatus::Active),
        "sold" => Ok(ProductStatus::Sold),
        "inactive" => Ok(ProductStatus::Inactive),
        other => Err(unknown("product status", other)),
    }
}

pub fn service_status_str(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Pending => "pending",
        ServiceStatus::Active => "active",
        ServiceStatus::Inactive => "inactive",
    }
}

pub fn parse_service_status(value: &str) -> Result<ServiceStatus, RepoError> {
    match value {
        "pending" => Ok(ServiceStatus::Pending),
        "active" => Ok(ServiceStatus::Active),
        "inactive" => Ok(ServiceStatus::Inactive),
        other => Err(unknown("service status", other)),
    }
}

pub fn condition_str(condition: Condition) -> &'static str {
    match condition {
        Condition::New => "new",
        Condition::LikeNew => "like_new",
        Condition::Good => "good",
        Condition::Fair => "fair",
        Condition::ForParts => "for_parts",
    }
}

pub fn parse_condition(value: &str) -> Result<Condition, RepoError> {
    match value {
        "new" => Ok(Condition::New),
        "like_new" => Ok(Condition::LikeNew),
        "good" => Ok(Condition::Good),
        "fair" => Ok(Condition::Fair),
        "for_parts" => Ok(Condition::ForParts),
        other => Err(unknown("condition", other)),
    }
}

pub fn price_type_str(price_type: PriceType) -> &'static str {
    match price_type {
        PriceType::Fixed => "fixed",
        PriceType::Hourly => "hourly",
        PriceType::Negotiable => "negotiable",
    }
}

pub fn parse_price_type(value: &str) -> Result<PriceType, RepoError> {
    match value {
        "fixed" => Ok(PriceType::Fixed),
        "hourly" => Ok(PriceType::Hourly),
        "negotiable" => Ok(PriceType::Negotiable),
        other => Err(unknown("price type", other)),
    }
}

pub fn promotion_status_str(status: PromotionStatus) -> &'static str {
    match status {
        PromotionStatus::Pending => "pending",
        PromotionStatus::Active => "active",
        PromotionStatus::Expired => "expired",
        PromotionStatus::Cancelled => "cancelled",
    }
}

pub fn parse_promotion_status(value: &str) -> Result<PromotionStatus, RepoError> {
    match value {
        "pending" => Ok(PromotionStatus::Pending),
        "active" => Ok(PromotionStatus::Active),
        "expired" => Ok(PromotionStatus::Expired),
        "cancelled" => Ok(PromotionStatus::Cancelled),
        other => Err(unknown("promotion status", other)),
    }
}

pub fn change_status_str(status: ChangeRequestStatus) -> &'static str {
    match status {
        ChangeRequestStatus::Pending => "pending",
        ChangeRequestStatus::Approved => "approved",
        ChangeRequestStatus::Rejected => "rejected",
    }
}

pub fn parse_change_status(value: &str) -> Result<ChangeRequestStatus, RepoError> {
    match value {
        "pending" => Ok(ChangeRequestStatus::Pending),
        "approved" => Ok(ChangeRequestStatus::Approved),
        "rejected" => Ok(ChangeRequestStatus::Rejected),
        other => Err(unknown("change request status", other)),
    }
}

pub fn listing_ref_columns(listing: ListingRef) -> (&'static str, Uuid) {
    (listing.kind.as_str(), listing.id)
}

pub fn parse_listing_ref(kind: &str, id: Uuid) -> Result<ListingRef, RepoError> {
    let kind = kind
        .parse::<ListingKind>()
        .map_err(|e| -> RepoError { e.into() })?;
    Ok(ListingRef { kind, id })
}

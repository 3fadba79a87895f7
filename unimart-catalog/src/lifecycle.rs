use chrono::Utc;
use unimart_shared::Principal;
use uuid::Uuid;

use crate::product::{Condition, Product, ProductStatus, Service, ServiceStatus};
use crate::CatalogError;

/// Lowercase, word-separated slug form of a title.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug assigned once at creation: slugified title plus the first 8
/// characters of the identifier, unique even for duplicate titles.
/// Never regenerated, even when the title later changes.
pub fn slug_for(title: &str, id: Uuid) -> String {
    format!("{}-{}", slugify(title), &id.to_string()[..8])
}

/// Fields the owner may edit directly. Price, images and category changes
/// go through moderation or an admin.
#[derive(Debug, Clone, Default)]
pub struct ListingEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub campus: Option<Option<String>>,
    /// Product only; ignored for services.
    pub condition: Option<Condition>,
}

/// Status transitions and owner-limited edits for both listing variants.
pub struct Lifecycle;

impl Lifecycle {
    /// Transition a product's status. Owners follow the state machine;
    /// staff may override any transition (including un-selling).
    pub fn set_product_status(
        product: &mut Product,
        to: ProductStatus,
        actor: &Principal,
    ) -> Result<(), CatalogError> {
        if !actor.can_manage(product.seller_id) {
            return Err(CatalogError::Unauthorized(
                "only the seller or an admin may change listing status".into(),
            ));
        }
        if product.status == to {
            return Ok(());
        }

        let allowed_for_owner = matches!(
            (product.status, to),
            (ProductStatus::Pending, ProductStatus::Active)
                | (ProductStatus::Active, ProductStatus::Inactive)
                | (ProductStatus::Inactive, ProductStatus::Active)
                | (ProductStatus::Active, ProductStatus::Sold)
        );

        if !allowed_for_owner && !actor.is_staff {
            return Err(CatalogError::InvalidTransition {
                from: format!("{:?}", product.status),
                to: format!("{:?}", to),
            });
        }

        product.status = to;
        product.updated_at = Utc::now();
        Ok(())
    }

    /// Service variant: no `sold` state.
    pub fn set_service_status(
        service: &mut Service,
        to: ServiceStatus,
        actor: &Principal,
    ) -> Result<(), CatalogError> {
        if !actor.can_manage(service.provider_id) {
            return Err(CatalogError::Unauthorized(
                "only the provider or an admin may change listing status".into(),
            ));
        }
        if service.status == to {
            return Ok(());
        }

        let allowed_for_owner = matches!(
            (service.status, to),
            (ServiceStatus::Pending, ServiceStatus::Active)
                | (ServiceStatus::Active, ServiceStatus::Inactive)
                | (ServiceStatus::Inactive, ServiceStatus::Active)
        );

        if !allowed_for_owner && !actor.is_staff {
            return Err(CatalogError::InvalidTransition {
                from: format!("{:?}", service.status),
                to: format!("{:?}", to),
            });
        }

        service.status = to;
        service.updated_at = Utc::now();
        Ok(())
    }

    /// Apply an owner-limited edit. The slug is never touched.
    pub fn edit_product(
        product: &mut Product,
        edit: ListingEdit,
        actor: &Principal,
    ) -> Result<(), CatalogError> {
        if !actor.can_manage(product.seller_id) {
            return Err(CatalogError::Unauthorized(
                "only the seller or an admin may edit this listing".into(),
            ));
        }
        if let Some(title) = edit.title {
            if title.trim().is_empty() {
                return Err(CatalogError::Validation("title must not be empty".into()));
            }
            product.title = title;
        }
        if let Some(description) = edit.description {
            product.description = description;
        }
        if let Some(location) = edit.location {
            product.location = location;
        }
        if let Some(campus) = edit.campus {
            product.campus = campus;
        }
        if let Some(condition) = edit.condition {
            product.condition = condition;
        }
        product.updated_at = Utc::now();
        Ok(())
    }

    pub fn edit_service(
        service: &mut Service,
        edit: ListingEdit,
        actor: &Principal,
    ) -> Result<(), CatalogError> {
        if !actor.can_manage(service.provider_id) {
            return Err(CatalogError::Unauthorized(
                "only the provider or an admin may edit this listing".into(),
            ));
        }
        if let Some(title) = edit.title {
            if title.trim().is_empty() {
                return Err(CatalogError::Validation("title must not be empty".into()));
            }
            service.title = title;
        }
        if let Some(description) = edit.description {
            service.description = description;
        }
        if let Some(location) = edit.location {
            service.location = location;
        }
        if let Some(campus) = edit.campus {
            service.campus = campus;
        }
        service.updated_at = Utc::now();
        Ok(())
    }

    /// Hard delete is owner-or-admin gated; the storage layer cascades to
    /// dependent reviews, promotions, change requests and messages.
    pub fn authorize_delete(owner_id: Uuid, actor: &Principal) -> Result<(), CatalogError> {
        if !actor.can_manage(owner_id) {
            return Err(CatalogError::Unauthorized(
                "only the owner or an admin may delete this listing".into(),
            ));
        }
        Ok(())
    }
}

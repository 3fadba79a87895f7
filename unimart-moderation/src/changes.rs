use chrono::Utc;
use unimart_catalog::Product;
use unimart_shared::Principal;

use crate::models::{AvailabilityReport, ChangePayload, ChangeRequest, ChangeRequestStatus};
use crate::ModerationError;

/// What an approval pass did with a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Applied,
    Rejected,
    /// Request was already terminal; left untouched.
    Skipped,
}

/// Applies admin decisions to queued change requests.
pub struct ChangeRequestHandler;

impl ChangeRequestHandler {
    /// Approve one request: apply its mutation to the product, then stamp
    /// status, reviewer and timestamp. Already-resolved requests are
    /// skipped untouched, so a second batch pass is idempotent.
    pub fn approve(
        request: &mut ChangeRequest,
        product: &mut Product,
        admin: &Principal,
    ) -> Result<ReviewOutcome, ModerationError> {
        Self::require_admin(admin)?;
        if request.product_id != product.id {
            return Err(ModerationError::Validation(
                "change request does not reference this product".into(),
            ));
        }
        if !request.is_pending() {
            return Ok(ReviewOutcome::Skipped);
        }

        match &request.payload {
            ChangePayload::Price {
                requested_price, ..
            } => {
                // Overwrites the vendor price; commission and final price
                // recompute before anything is persisted.
                product.set_vendor_price(*requested_price)?;
            }
            ChangePayload::Images { new_images } => {
                product.images.overwrite(new_images)?;
            }
        }

        request.status = ChangeRequestStatus::Approved;
        request.reviewed_by = Some(admin.id);
        request.reviewed_at = Some(Utc::now());
        Ok(ReviewOutcome::Applied)
    }

    /// Reject one request: stamps only, the product is untouched.
    pub fn reject(
        request: &mut ChangeRequest,
        admin: &Principal,
        note: Option<String>,
    ) -> Result<ReviewOutcome, ModerationError> {
        Self::require_admin(admin)?;
        if !request.is_pending() {
            return Ok(ReviewOutcome::Skipped);
        }

        request.status = ChangeRequestStatus::Rejected;
        request.admin_note = note;
        request.reviewed_by = Some(admin.id);
        request.reviewed_at = Some(Utc::now());
        Ok(ReviewOutcome::Rejected)
    }

    /// Resolve an availability report with an optional note.
    pub fn resolve_report(
        report: &mut AvailabilityReport,
        admin: &Principal,
        note: Option<String>,
    ) -> Result<(), ModerationError> {
        Self::require_admin(admin)?;
        report.is_resolved = true;
        report.admin_note = note;
        report.resolved_at = Some(Utc::now());
        Ok(())
    }

    fn require_admin(actor: &Principal) -> Result<(), ModerationError> {
        if !actor.is_staff {
            return Err(ModerationError::Unauthorized(
                "change request review is admin-only".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use unimart_catalog::{Condition, NewProduct};
    use uuid::Uuid;

    fn product() -> Product {
        Product::new(NewProduct {
            seller_id: Uuid::new_v4(),
            category_id: None,
            title: "Desk lamp".to_string(),
            description: "Warm white".to_string(),
            vendor_price: dec!(8000),
            condition: Condition::Good,
            location: "Block C".to_string(),
            campus: None,
            whatsapp_number: None,
            images: vec!["https://img/a.jpg".into(), "https://img/b.jpg".into()],
        })
        .unwrap()
    }

    #[test]
    fn approving_a_price_request_recomputes_the_listing() {
        let mut product = product();
        let seller = product.seller_id;
        let mut request =
            ChangeRequest::price(&product, seller, dec!(15000), "market moved".into()).unwrap();
        let admin = Principal::admin(Uuid::new_v4(), "ops");

        let outcome = ChangeRequestHandler::approve(&mut request, &mut product, &admin).unwrap();

        assert_eq!(outcome, ReviewOutcome::Applied);
        assert_eq!(product.vendor_price, dec!(15000));
        assert_eq!(product.commission_rate, dec!(10.00));
        assert_eq!(product.price, dec!(16500.00));
        assert_eq!(request.status, ChangeRequestStatus::Approved);
        assert_eq!(request.reviewed_by, Some(admin.id));
        assert!(request.reviewed_at.is_some());
    }

    #[test]
    fn a_second_approval_pass_skips_resolved_requests() {
        let mut product = product();
        let mut request =
            ChangeRequest::price(&product, product.seller_id, dec!(15000), "bump".into()).unwrap();
        let admin = Principal::admin(Uuid::new_v4(), "ops");

        ChangeRequestHandler::approve(&mut request, &mut product, &admin).unwrap();
        let price_after_first = product.price;

        let outcome = ChangeRequestHandler::approve(&mut request, &mut product, &admin).unwrap();
        assert_eq!(outcome, ReviewOutcome::Skipped);
        assert_eq!(product.price, price_after_first);
    }

    #[test]
    fn approving_an_image_request_overwrites_slots_positionally() {
        let mut product = product();
        let urls = vec!["https://img/new1.jpg".to_string(), "https://img/new2.jpg".to_string()];
        let mut request =
            ChangeRequest::images(&product, product.seller_id, urls, "better photos".into())
                .unwrap();
        let admin = Principal::admin(Uuid::new_v4(), "ops");

        ChangeRequestHandler::approve(&mut request, &mut product, &admin).unwrap();

        assert_eq!(product.images.get(0), Some("https://img/new1.jpg"));
        assert_eq!(product.images.get(1), Some("https://img/new2.jpg"));
        assert_eq!(product.images.get(2), None);
    }

    #[test]
    fn rejection_leaves_the_product_untouched() {
        let mut product = product();
        let before = product.clone();
        let mut request =
            ChangeRequest::price(&product, product.seller_id, dec!(500), "fire sale".into())
                .unwrap();
        let admin = Principal::admin(Uuid::new_v4(), "ops");

        ChangeRequestHandler::reject(&mut request, &admin, Some("too low".into())).unwrap();

        assert_eq!(product, before);
        assert_eq!(request.status, ChangeRequestStatus::Rejected);
        assert_eq!(request.admin_note.as_deref(), Some("too low"));
        assert!(request.reviewed_at.is_some());
    }

    #[test]
    fn non_admins_cannot_review() {
        let mut product = product();
        let seller = Principal::user(product.seller_id, "chidi");
        let mut request =
            ChangeRequest::price(&product, product.seller_id, dec!(9000), "tweak".into()).unwrap();

        let result = ChangeRequestHandler::approve(&mut request, &mut product, &seller);
        assert!(matches!(result, Err(ModerationError::Unauthorized(_))));
        assert!(request.is_pending());
    }

    #[test]
    fn creation_validates_payloads() {
        let product = product();
        assert!(ChangeRequest::price(&product, product.seller_id, dec!(-1), "bad".into()).is_err());
        assert!(
            ChangeRequest::images(&product, product.seller_id, vec![], "empty".into()).is_err()
        );
        let four: Vec<String> = (0..4).map(|i| format!("https://img/{}.jpg", i)).collect();
        assert!(
            ChangeRequest::images(&product, product.seller_id, four, "too many".into()).is_err()
        );
    }

    #[test]
    fn availability_reports_resolve_with_a_note() {
        let product = product();
        let mut report =
            AvailabilityReport::new(product.id, Uuid::new_v4(), "seller unreachable".into());
        let admin = Principal::admin(Uuid::new_v4(), "ops");

        ChangeRequestHandler::resolve_report(&mut report, &admin, Some("delisted".into())).unwrap();

        assert!(report.is_resolved);
        assert_eq!(report.admin_note.as_deref(), Some("delisted"));
        assert!(report.resolved_at.is_some());
    }
}

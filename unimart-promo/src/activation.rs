use chrono::{DateTime, Duration, Utc};
use unimart_catalog::Listing;
use unimart_shared::Principal;

use crate::models::{Promotion, PromotionPackage, PromotionStatus};
use crate::PromoError;

/// Result of an activation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated,
    /// Promotion was not pending; nothing changed and featuring side
    /// effects were not re-applied.
    AlreadyResolved,
}

/// Admin-driven promotion transitions.
pub struct PromotionHandler;

impl PromotionHandler {
    /// Activate a pending promotion and propagate featuring to the
    /// listing. Ordering: end date from the package duration, promotion
    /// state, then the listing's flag and window. Without a package the
    /// listing is left alone.
    pub fn activate(
        promotion: &mut Promotion,
        package: Option<&PromotionPackage>,
        listing: &mut dyn Listing,
        admin: &Principal,
        now: DateTime<Utc>,
    ) -> Result<ActivationOutcome, PromoError> {
        Self::require_admin(admin)?;
        if promotion.listing != listing.listing_ref() {
            return Err(PromoError::Validation(
                "promotion does not reference this listing".into(),
            ));
        }
        if !promotion.is_pending() {
            return Ok(ActivationOutcome::AlreadyResolved);
        }

        promotion.status = PromotionStatus::Active;
        promotion.start_date = Some(now);

        if let Some(package) = package {
            let end = now + Duration::days(i64::from(package.duration_days));
            promotion.end_date = Some(end);
            listing.set_featured(Some(end));
        }

        Ok(ActivationOutcome::Activated)
    }

    /// Batch expiry flips active promotions to expired. The listing's
    /// featured flag is deliberately left alone: read paths decide
    /// visibility with the currently-featured predicate, so an elapsed
    /// `featured_until` already ends the boost.
    pub fn expire_batch<'a, I>(promotions: I, admin: &Principal) -> Result<usize, PromoError>
    where
        I: IntoIterator<Item = &'a mut Promotion>,
    {
        Self::require_admin(admin)?;
        let mut count = 0;
        for promotion in promotions {
            if promotion.status == PromotionStatus::Active {
                promotion.status = PromotionStatus::Expired;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Cancel a promotion that has not yet been activated.
    pub fn cancel(promotion: &mut Promotion, admin: &Principal) -> Result<(), PromoError> {
        Self::require_admin(admin)?;
        if !promotion.is_pending() {
            return Err(PromoError::InvalidTransition {
                from: format!("{:?}", promotion.status),
                to: "CANCELLED".to_string(),
            });
        }
        promotion.status = PromotionStatus::Cancelled;
        Ok(())
    }

    fn require_admin(actor: &Principal) -> Result<(), PromoError> {
        if !actor.is_staff {
            return Err(PromoError::Unauthorized(
                "promotion management is admin-only".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use unimart_catalog::{Condition, NewProduct, Product};
    use uuid::Uuid;

    fn product() -> Product {
        Product::new(NewProduct {
            seller_id: Uuid::new_v4(),
            category_id: None,
            title: "Mini fridge".to_string(),
            description: "40L".to_string(),
            vendor_price: dec!(20000),
            condition: Condition::Good,
            location: "Block A".to_string(),
            campus: None,
            whatsapp_number: None,
            images: vec!["https://img/a.jpg".into(), "https://img/b.jpg".into()],
        })
        .unwrap()
    }

    fn week_package() -> PromotionPackage {
        PromotionPackage::new("Weekly boost".into(), 7, dec!(1000), "7 days featured".into())
    }

    #[test]
    fn activation_stamps_dates_and_features_the_listing() {
        let mut product = product();
        let package = week_package();
        let mut promotion = Promotion::new(product.listing_ref(), &package);
        let admin = Principal::admin(Uuid::new_v4(), "ops");
        let now = Utc::now();

        let outcome = PromotionHandler::activate(
            &mut promotion,
            Some(&package),
            &mut product,
            &admin,
            now,
        )
        .unwrap();

        assert_eq!(outcome, ActivationOutcome::Activated);
        assert_eq!(promotion.status, PromotionStatus::Active);
        assert_eq!(promotion.start_date, Some(now));
        assert_eq!(promotion.end_date, Some(now + Duration::days(7)));
        assert!(product.is_featured);
        assert_eq!(product.featured_until, promotion.end_date);
        assert!(product.is_currently_featured(now));
    }

    #[test]
    fn reactivation_is_a_no_op() {
        let mut product = product();
        let package = week_package();
        let mut promotion = Promotion::new(product.listing_ref(), &package);
        let admin = Principal::admin(Uuid::new_v4(), "ops");
        let now = Utc::now();

        PromotionHandler::activate(&mut promotion, Some(&package), &mut product, &admin, now)
            .unwrap();
        let first_end = promotion.end_date;

        let later = now + Duration::days(3);
        let outcome = PromotionHandler::activate(
            &mut promotion,
            Some(&package),
            &mut product,
            &admin,
            later,
        )
        .unwrap();

        assert_eq!(outcome, ActivationOutcome::AlreadyResolved);
        assert_eq!(promotion.end_date, first_end);
        assert_eq!(product.featured_until, first_end);
    }

    #[test]
    fn activation_without_a_package_skips_featuring() {
        let mut product = product();
        let package = week_package();
        let mut promotion = Promotion::new(product.listing_ref(), &package);
        promotion.package_id = None;
        let admin = Principal::admin(Uuid::new_v4(), "ops");

        PromotionHandler::activate(&mut promotion, None, &mut product, &admin, Utc::now())
            .unwrap();

        assert_eq!(promotion.status, PromotionStatus::Active);
        assert_eq!(promotion.end_date, None);
        assert!(!product.is_featured);
    }

    #[test]
    fn expiry_flips_status_without_touching_the_listing() {
        let mut product = product();
        let package = week_package();
        let mut promotion = Promotion::new(product.listing_ref(), &package);
        let admin = Principal::admin(Uuid::new_v4(), "ops");
        let now = Utc::now();

        PromotionHandler::activate(&mut promotion, Some(&package), &mut product, &admin, now)
            .unwrap();

        let count = PromotionHandler::expire_batch([&mut promotion], &admin).unwrap();
        assert_eq!(count, 1);
        assert_eq!(promotion.status, PromotionStatus::Expired);
        // Flag stays; visibility ends through the featured_until window.
        assert!(product.is_featured);

        let count = PromotionHandler::expire_batch([&mut promotion], &admin).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn cancel_only_from_pending() {
        let mut product = product();
        let package = week_package();
        let mut promotion = Promotion::new(product.listing_ref(), &package);
        let admin = Principal::admin(Uuid::new_v4(), "ops");

        PromotionHandler::cancel(&mut promotion, &admin).unwrap();
        assert_eq!(promotion.status, PromotionStatus::Cancelled);

        let mut active = Promotion::new(product.listing_ref(), &package);
        PromotionHandler::activate(&mut active, Some(&package), &mut product, &admin, Utc::now())
            .unwrap();
        assert!(matches!(
            PromotionHandler::cancel(&mut active, &admin),
            Err(PromoError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn non_admins_cannot_activate() {
        let mut product = product();
        let package = week_package();
        let mut promotion = Promotion::new(product.listing_ref(), &package);
        let user = Principal::user(Uuid::new_v4(), "chidi");

        let result = PromotionHandler::activate(
            &mut promotion,
            Some(&package),
            &mut product,
            &user,
            Utc::now(),
        );
        assert!(matches!(result, Err(PromoError::Unauthorized(_))));
        assert!(promotion.is_pending());
    }
}

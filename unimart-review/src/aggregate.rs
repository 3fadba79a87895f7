use rust_decimal::Decimal;
use unimart_shared::ListingRef;

use crate::models::Review;
use crate::ReviewError;

/// Arithmetic mean over the approved reviews in a slice, rounded to two
/// decimal places. Zero when no approved reviews exist.
pub fn average_of(reviews: &[Review]) -> Decimal {
    let approved: Vec<_> = reviews.iter().filter(|r| r.is_approved).collect();
    if approved.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = approved.iter().map(|r| Decimal::from(r.rating)).sum();
    (sum / Decimal::from(approved.len() as u64)).round_dp(2)
}

/// Display set for non-staff readers. Unapproved reviews stay out of
/// every public listing and detail response.
pub fn approved_only(reviews: Vec<Review>) -> Vec<Review> {
    reviews.into_iter().filter(|r| r.is_approved).collect()
}

/// One review per reviewer per listing, approved or not. `existing` is
/// the reviewer's prior review of the listing, looked up before anything
/// is created.
pub fn ensure_first_review(
    listing: ListingRef,
    existing: Option<&Review>,
) -> Result<(), ReviewError> {
    if existing.is_some() {
        return Err(ReviewError::DuplicateReview {
            listing: listing.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn listing() -> ListingRef {
        ListingRef::product(Uuid::new_v4())
    }

    fn review(listing: ListingRef, rating: u8) -> Review {
        Review::new(listing, Uuid::new_v4(), rating, "ok".into()).unwrap()
    }

    #[test]
    fn average_excludes_unapproved_reviews() {
        let listing = listing();
        let mut reviews: Vec<_> = [3u8, 4, 5].map(|r| review(listing, r)).into();
        let mut low = review(listing, 1);
        low.is_approved = false;
        reviews.push(low);

        assert_eq!(average_of(&reviews), dec!(4.00));
    }

    #[test]
    fn no_approved_reviews_reports_zero() {
        assert_eq!(average_of(&[]), Decimal::ZERO);

        let mut only = review(listing(), 5);
        only.is_approved = false;
        assert_eq!(average_of(&[only]), Decimal::ZERO);
    }

    #[test]
    fn unapproved_reviews_are_dropped_from_display() {
        let listing = listing();
        let kept = review(listing, 4);
        let mut hidden = review(listing, 1);
        hidden.is_approved = false;

        let visible = approved_only(vec![kept.clone(), hidden]);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, kept.id);
    }

    #[test]
    fn second_review_from_same_reviewer_is_rejected() {
        let listing = listing();
        let first = review(listing, 4);

        assert!(ensure_first_review(listing, None).is_ok());
        let result = ensure_first_review(listing, Some(&first));
        assert!(matches!(result, Err(ReviewError::DuplicateReview { .. })));
    }

    #[test]
    fn rating_must_be_in_range() {
        let listing = listing();
        assert!(Review::new(listing, Uuid::new_v4(), 0, "zero".into()).is_err());
        assert!(Review::new(listing, Uuid::new_v4(), 6, "six".into()).is_err());
        assert!(Review::new(listing, Uuid::new_v4(), 5, "five".into()).is_ok());
    }
}

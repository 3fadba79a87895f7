use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use unimart_review::{approved_only, average_of, ensure_first_review, Review};
use unimart_shared::models::events::ReviewSubmittedEvent;
use unimart_shared::{ListingKind, ListingRef};

use crate::{auth::Auth, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/listings/{kind}/{id}/reviews",
        get(list_reviews).post(submit_review),
    )
}

fn listing_from_path(kind: &str, id: Uuid) -> Result<ListingRef, AppError> {
    let kind = kind
        .parse::<ListingKind>()
        .map_err(AppError::ValidationError)?;
    Ok(ListingRef { kind, id })
}

#[derive(Debug, Serialize)]
struct ReviewPage {
    reviews: Vec<Review>,
    average_rating: Decimal,
}

async fn list_reviews(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<ReviewPage>, AppError> {
    let listing = listing_from_path(&kind, id)?;
    // Unapproved reviews are hidden from readers; moderation happens on
    // the admin surface.
    let reviews = approved_only(state.reviews.list_for_listing(listing).await?);
    let average_rating = average_of(&reviews);
    Ok(Json(ReviewPage {
        reviews,
        average_rating,
    }))
}

#[derive(Debug, Deserialize)]
struct SubmitReviewRequest {
    rating: u8,
    comment: String,
}

async fn submit_review(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(req): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let listing = listing_from_path(&kind, id)?;

    // One review per reviewer per listing, approved or not; nothing is
    // created when the gate trips.
    let existing = state.reviews.find_by_reviewer(listing, actor.id).await?;
    ensure_first_review(listing, existing.as_ref())?;

    let review = Review::new(listing, actor.id, req.rating, req.comment)?;
    state.reviews.create(&review).await?;
    let event = ReviewSubmittedEvent {
        review_id: review.id,
        listing,
        reviewer_id: review.reviewer_id,
        rating: review.rating,
        timestamp: review.created_at.timestamp(),
    };
    tracing::info!(
        target: "audit",
        payload = %serde_json::to_string(&event).unwrap_or_default(),
        "review submitted"
    );
    Ok((StatusCode::CREATED, Json(review)))
}

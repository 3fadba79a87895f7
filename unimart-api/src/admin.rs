use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use unimart_core::messaging::{availability_inquiry, whatsapp_link};
use unimart_moderation::{ChangePayload, ChangeRequest, ChangeRequestHandler, ReviewOutcome};
use unimart_promo::{ActivationOutcome, Promotion, PromotionHandler, PromotionStatus};
use unimart_shared::models::events::{PriceChangedEvent, PromotionActivatedEvent};
use unimart_shared::{ListingKind, ListingRef, Principal};

use crate::{auth::Auth, error::AppError, products, services, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/change-requests", get(list_pending_requests))
        .route("/admin/change-requests/approve", post(approve_requests))
        .route("/admin/change-requests/{id}/reject", post(reject_request))
        .route("/admin/reports/{id}/resolve", post(resolve_report))
        .route("/admin/products/{id}/inquiry", get(vendor_inquiry))
        .route("/admin/promotions/{id}/activate", post(activate_promotion))
        .route("/admin/promotions/{id}/cancel", post(cancel_promotion))
        .route("/admin/promotions/expire", post(expire_promotions))
        .route("/admin/reviews/approval", post(set_review_approval))
}

fn require_staff(actor: &Principal) -> Result<(), AppError> {
    if !actor.is_staff {
        return Err(AppError::AuthorizationError(
            "this endpoint is admin-only".into(),
        ));
    }
    Ok(())
}

async fn list_pending_requests(
    State(state): State<AppState>,
    Auth(actor): Auth,
) -> Result<Json<Vec<ChangeRequest>>, AppError> {
    require_staff(&actor)?;
    let pending = state.change_requests.list_pending().await?;
    Ok(Json(pending))
}

#[derive(Debug, Deserialize)]
struct ApproveBatchRequest {
    ids: Vec<Uuid>,
}

#[derive(Debug, Default, Serialize)]
struct ApproveBatchResponse {
    applied: usize,
    /// Requests that were already resolved when the batch ran; approving
    /// twice is a no-op, not an error.
    skipped: usize,
    missing: Vec<Uuid>,
}

async fn approve_requests(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Json(req): Json<ApproveBatchRequest>,
) -> Result<Json<ApproveBatchResponse>, AppError> {
    require_staff(&actor)?;

    let mut response = ApproveBatchResponse::default();
    for id in req.ids {
        let Some(mut request) = state.change_requests.get(id).await? else {
            response.missing.push(id);
            continue;
        };
        let Some(mut product) = state.products.get(request.product_id).await? else {
            response.missing.push(id);
            continue;
        };

        match ChangeRequestHandler::approve(&mut request, &mut product, &actor)? {
            ReviewOutcome::Applied => {
                state
                    .change_requests
                    .save_with_product(&request, &product)
                    .await?;
                if matches!(request.payload, ChangePayload::Price { .. }) {
                    let event = PriceChangedEvent {
                        listing: ListingRef::product(product.id),
                        vendor_price: product.vendor_price,
                        commission_rate: product.commission_rate,
                        price: product.price,
                        change_request_id: Some(request.id),
                        timestamp: Utc::now().timestamp(),
                    };
                    tracing::info!(
                        target: "audit",
                        payload = %serde_json::to_string(&event).unwrap_or_default(),
                        "price change applied"
                    );
                }
                response.applied += 1;
            }
            ReviewOutcome::Skipped => response.skipped += 1,
            ReviewOutcome::Rejected => {}
        }
    }

    tracing::info!(
        applied = response.applied,
        skipped = response.skipped,
        "change request batch approved"
    );
    Ok(Json(response))
}

#[derive(Debug, Deserialize, Default)]
struct NoteRequest {
    note: Option<String>,
}

async fn reject_request(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<ChangeRequest>, AppError> {
    require_staff(&actor)?;
    let mut request = state
        .change_requests
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no change request with id {}", id)))?;

    ChangeRequestHandler::reject(&mut request, &actor, req.note)?;
    state.change_requests.save(&request).await?;
    Ok(Json(request))
}

async fn resolve_report(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<NoteRequest>,
) -> Result<Json<unimart_moderation::AvailabilityReport>, AppError> {
    require_staff(&actor)?;
    let mut report = state
        .reports
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no availability report with id {}", id)))?;

    ChangeRequestHandler::resolve_report(&mut report, &actor, req.note)?;
    state.reports.save(&report).await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize)]
struct VendorInquiry {
    inquiry_link: String,
}

/// Chat link staff use to ask a vendor whether a reported listing is still
/// available.
async fn vendor_inquiry(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<VendorInquiry>, AppError> {
    require_staff(&actor)?;
    let product = products::get_product(&state, id).await?;
    let number = product.whatsapp_number.as_deref().ok_or_else(|| {
        AppError::ValidationError("listing has no WhatsApp contact on file".into())
    })?;
    let inquiry_link = whatsapp_link(number, &availability_inquiry(&product));
    Ok(Json(VendorInquiry { inquiry_link }))
}

async fn activate_promotion(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Promotion>, AppError> {
    require_staff(&actor)?;
    let mut promotion = get_promotion(&state, id).await?;
    let package = match promotion.package_id {
        Some(package_id) => state.promotions.get_package(package_id).await?,
        None => None,
    };
    let now = Utc::now();

    // Activation and the listing's featuring window commit together.
    let mut activated = false;
    match promotion.listing.kind {
        ListingKind::Product => {
            let mut product = products::get_product(&state, promotion.listing.id).await?;
            let outcome = PromotionHandler::activate(
                &mut promotion,
                package.as_ref(),
                &mut product,
                &actor,
                now,
            )?;
            if outcome == ActivationOutcome::Activated {
                state
                    .promotions
                    .save_with_listing(
                        &promotion,
                        promotion.listing,
                        product.is_featured,
                        product.featured_until,
                    )
                    .await?;
                activated = true;
            }
        }
        ListingKind::Service => {
            let mut service = services::get_service(&state, promotion.listing.id).await?;
            let outcome = PromotionHandler::activate(
                &mut promotion,
                package.as_ref(),
                &mut service,
                &actor,
                now,
            )?;
            if outcome == ActivationOutcome::Activated {
                state
                    .promotions
                    .save_with_listing(
                        &promotion,
                        promotion.listing,
                        service.is_featured,
                        service.featured_until,
                    )
                    .await?;
                activated = true;
            }
        }
    }

    if activated {
        let event = PromotionActivatedEvent {
            promotion_id: promotion.id,
            listing: promotion.listing,
            featured_until: promotion.end_date.map(|d| d.timestamp()),
            timestamp: now.timestamp(),
        };
        tracing::info!(
            target: "audit",
            payload = %serde_json::to_string(&event).unwrap_or_default(),
            "promotion activated"
        );
    }

    Ok(Json(promotion))
}

async fn cancel_promotion(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Promotion>, AppError> {
    require_staff(&actor)?;
    let mut promotion = get_promotion(&state, id).await?;
    PromotionHandler::cancel(&mut promotion, &actor)?;
    state.promotions.save(&promotion).await?;
    Ok(Json(promotion))
}

#[derive(Debug, Deserialize)]
struct ExpireBatchRequest {
    ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
struct ExpireBatchResponse {
    expired: usize,
}

/// Flip elapsed promotions to expired. The listing's featuring flag is
/// left alone; the currently-featured window predicate governs visibility.
async fn expire_promotions(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Json(req): Json<ExpireBatchRequest>,
) -> Result<Json<ExpireBatchResponse>, AppError> {
    require_staff(&actor)?;

    let mut promotions = Vec::new();
    for id in req.ids {
        if let Some(promotion) = state.promotions.get(id).await? {
            promotions.push(promotion);
        }
    }

    let expired = PromotionHandler::expire_batch(promotions.iter_mut(), &actor)?;
    for promotion in &promotions {
        if promotion.status == PromotionStatus::Expired {
            state.promotions.save(promotion).await?;
        }
    }
    Ok(Json(ExpireBatchResponse { expired }))
}

#[derive(Debug, Deserialize)]
struct ReviewApprovalRequest {
    ids: Vec<Uuid>,
    approved: bool,
}

#[derive(Debug, Serialize)]
struct ReviewApprovalResponse {
    updated: u64,
}

async fn set_review_approval(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Json(req): Json<ReviewApprovalRequest>,
) -> Result<Json<ReviewApprovalResponse>, AppError> {
    require_staff(&actor)?;
    let updated = state.reviews.set_approved(&req.ids, req.approved).await?;
    Ok(Json(ReviewApprovalResponse { updated }))
}

async fn get_promotion(state: &AppState, id: Uuid) -> Result<Promotion, AppError> {
    state
        .promotions
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no promotion with id {}", id)))
}

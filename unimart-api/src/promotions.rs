use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use unimart_catalog::Listing;
use unimart_core::messaging::{promotion_request_message, whatsapp_link};
use unimart_promo::{Promotion, PromotionPackage};
use unimart_shared::{ListingKind, ListingRef};

use crate::{auth::Auth, error::AppError, products, services, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/promotions/packages", get(list_packages))
        .route("/promotions", axum::routing::post(request_promotion))
}

async fn list_packages(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromotionPackage>>, AppError> {
    let packages = state.promotions.list_packages().await?;
    Ok(Json(packages))
}

#[derive(Debug, Deserialize)]
struct PromotionRequest {
    listing_kind: ListingKind,
    listing_id: Uuid,
    package_id: Uuid,
}

#[derive(Debug, Serialize)]
struct PromotionResponse {
    #[serde(flatten)]
    promotion: Promotion,
    /// Pre-filled chat link the seller follows to arrange payment with the
    /// admin contact. Activation itself stays admin-driven.
    payment_link: String,
}

async fn request_promotion(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Json(req): Json<PromotionRequest>,
) -> Result<(StatusCode, Json<PromotionResponse>), AppError> {
    let package = state
        .promotions
        .get_package(req.package_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| {
            AppError::NotFoundError(format!("no active package with id {}", req.package_id))
        })?;

    let listing = ListingRef {
        kind: req.listing_kind,
        id: req.listing_id,
    };

    // The seller promotes their own listing; admins may act for anyone.
    let message = match listing.kind {
        ListingKind::Product => {
            let product = products::get_product(&state, listing.id).await?;
            if !actor.can_manage(product.seller_id) {
                return Err(AppError::AuthorizationError(
                    "only the seller may promote this listing".into(),
                ));
            }
            promotion_request_message(&product, &package, &actor)
        }
        ListingKind::Service => {
            let service = services::get_service(&state, listing.id).await?;
            if !actor.can_manage(service.owner_id()) {
                return Err(AppError::AuthorizationError(
                    "only the provider may promote this listing".into(),
                ));
            }
            promotion_request_message(&service, &package, &actor)
        }
    };

    let promotion = Promotion::new(listing, &package);
    state.promotions.create(&promotion).await?;

    let payment_link = whatsapp_link(&state.site.admin_whatsapp, &message);
    Ok((
        StatusCode::CREATED,
        Json(PromotionResponse {
            promotion,
            payment_link,
        }),
    ))
}

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use unimart_catalog::{Condition, Lifecycle, Listing, ListingEdit, NewProduct, Product, ProductStatus};
use unimart_core::messaging::{interest_message, whatsapp_link};
use unimart_core::repository::BrowseFilter;
use unimart_moderation::{AvailabilityReport, ChangeRequest};
use unimart_review::{approved_only, average_of, Review};
use unimart_shared::models::events::ListingCreatedEvent;
use unimart_shared::ListingRef;

use crate::{
    auth::Auth,
    error::AppError,
    state::AppState,
    upload::{read_listing_form, upload_images, upload_video},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(browse_products).post(create_product))
        // Detail is addressed by slug, mutations by id; both occupy the
        // same path position.
        .route(
            "/products/{key}",
            get(product_detail)
                .patch(edit_product)
                .delete(delete_product),
        )
        .route("/products/{key}/status", post(set_status))
        .route("/products/{key}/change-requests", post(open_change_request))
        .route("/products/{key}/report", post(report_unavailable))
}

#[derive(Debug, Deserialize, Default)]
pub struct BrowseParams {
    pub q: Option<String>,
    pub category_id: Option<Uuid>,
    pub campus: Option<String>,
    pub condition: Option<Condition>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub featured: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl BrowseParams {
    pub fn into_filter(self) -> BrowseFilter {
        BrowseFilter {
            query: self.q,
            category_id: self.category_id,
            campus: self.campus,
            condition: self.condition,
            min_price: self.min_price,
            max_price: self.max_price,
            featured_only: self.featured,
            page: self.page.unwrap_or(0),
            page_size: self.page_size.unwrap_or(20),
        }
    }
}

async fn browse_products(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.browse(&params.into_filter()).await?;
    Ok(Json(products))
}

#[derive(Debug, Serialize)]
struct ProductDetail {
    #[serde(flatten)]
    product: Product,
    average_rating: Decimal,
    reviews: Vec<Review>,
    /// Deep link a buyer can follow to message the seller, when the seller
    /// listed a WhatsApp number.
    contact_link: Option<String>,
}

async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductDetail>, AppError> {
    let mut product = state
        .products
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no product with slug {}", slug)))?;

    // Every detail fetch is a view.
    state.products.increment_views(product.id).await?;
    product.record_view();

    let listing = ListingRef::product(product.id);
    let reviews = approved_only(state.reviews.list_for_listing(listing).await?);
    let average_rating = average_of(&reviews);

    let contact_link = product.whatsapp_number.as_deref().map(|number| {
        let url = format!("{}/products/{}", state.site.base_url, product.slug);
        whatsapp_link(number, &interest_message(&product, &url))
    });

    Ok(Json(ProductDetail {
        product,
        average_rating,
        reviews,
        contact_link,
    }))
}

#[derive(Debug, Deserialize)]
struct ProductForm {
    title: String,
    description: String,
    vendor_price: Decimal,
    condition: Condition,
    category_id: Option<Uuid>,
    location: String,
    campus: Option<String>,
    whatsapp_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatedListing<T> {
    #[serde(flatten)]
    listing: T,
    /// Set when an attached video was dropped for being outside the
    /// accepted duration window.
    warning: Option<String>,
}

async fn create_product(
    State(state): State<AppState>,
    Auth(actor): Auth,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedListing<Product>>), AppError> {
    let form = read_listing_form(multipart).await?;
    let spec: ProductForm = serde_json::from_value(serde_json::Value::Object(form.fields))
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let images = upload_images(state.uploader.as_ref(), &form.images).await?;
    let (video, warning) = upload_video(state.uploader.as_ref(), form.video).await?;

    let mut product = Product::new(NewProduct {
        seller_id: actor.id,
        category_id: spec.category_id,
        title: spec.title,
        description: spec.description,
        vendor_price: spec.vendor_price,
        condition: spec.condition,
        location: spec.location,
        campus: spec.campus,
        whatsapp_number: spec.whatsapp_number,
        images,
    })?;
    if let Some(video) = video {
        product.video_url = Some(video.url);
        product.video_duration_seconds = Some(video.duration_seconds);
    }

    state.products.create(&product).await?;
    let event = ListingCreatedEvent {
        listing: product.listing_ref(),
        owner_id: product.seller_id,
        slug: product.slug.clone(),
        timestamp: product.created_at.timestamp(),
    };
    tracing::info!(
        target: "audit",
        payload = %serde_json::to_string(&event).unwrap_or_default(),
        "listing created"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedListing {
            listing: product,
            warning,
        }),
    ))
}

#[derive(Debug, Deserialize, Default)]
struct EditRequest {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    /// Missing leaves the campus alone; explicit null clears it.
    #[serde(default)]
    campus: Option<Option<String>>,
    condition: Option<Condition>,
}

impl EditRequest {
    fn into_edit(self) -> ListingEdit {
        ListingEdit {
            title: self.title,
            description: self.description,
            location: self.location,
            campus: self.campus,
            condition: self.condition,
        }
    }
}

async fn edit_product(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<Product>, AppError> {
    let mut product = get_product(&state, id).await?;
    Lifecycle::edit_product(&mut product, req.into_edit(), &actor)?;
    state.products.save(&product).await?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ProductStatus,
}

async fn set_status(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Product>, AppError> {
    let mut product = get_product(&state, id).await?;
    Lifecycle::set_product_status(&mut product, req.status, &actor)?;
    state.products.save(&product).await?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let product = get_product(&state, id).await?;
    Lifecycle::authorize_delete(product.seller_id, &actor)?;
    state.products.delete(product.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "request_type", rename_all = "SCREAMING_SNAKE_CASE")]
enum ChangeRequestBody {
    Price {
        requested_price: Decimal,
        reason: String,
    },
    Images {
        new_images: Vec<String>,
        reason: String,
    },
}

async fn open_change_request(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeRequestBody>,
) -> Result<(StatusCode, Json<ChangeRequest>), AppError> {
    let product = get_product(&state, id).await?;
    if !actor.can_manage(product.seller_id) {
        return Err(AppError::AuthorizationError(
            "only the seller may request changes to this listing".into(),
        ));
    }

    let request = match body {
        ChangeRequestBody::Price {
            requested_price,
            reason,
        } => ChangeRequest::price(&product, actor.id, requested_price, reason)?,
        ChangeRequestBody::Images { new_images, reason } => {
            ChangeRequest::images(&product, actor.id, new_images, reason)?
        }
    };
    state.change_requests.create(&request).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
struct ReportRequest {
    reason: String,
}

async fn report_unavailable(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<ReportRequest>,
) -> Result<(StatusCode, Json<AvailabilityReport>), AppError> {
    let product = get_product(&state, id).await?;
    let report = AvailabilityReport::new(product.id, actor.id, req.reason);
    state.reports.create(&report).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub(crate) async fn get_product(state: &AppState, id: Uuid) -> Result<Product, AppError> {
    state
        .products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no product with id {}", id)))
}

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use unimart_catalog::{
    Lifecycle, Listing, ListingEdit, NewService, PriceType, Service, ServiceStatus,
};
use unimart_core::messaging::{interest_message, whatsapp_link};
use unimart_review::{approved_only, average_of, Review};
use unimart_shared::models::events::ListingCreatedEvent;
use unimart_shared::ListingRef;

use crate::{
    auth::Auth,
    error::AppError,
    products::BrowseParams,
    state::AppState,
    upload::{read_listing_form, upload_images, upload_video},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(browse_services).post(create_service))
        .route(
            "/services/{key}",
            get(service_detail)
                .patch(edit_service)
                .delete(delete_service),
        )
        .route("/services/{key}/status", post(set_status))
}

async fn browse_services(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Json<Vec<Service>>, AppError> {
    let services = state.services.browse(&params.into_filter()).await?;
    Ok(Json(services))
}

#[derive(Debug, Serialize)]
struct ServiceDetail {
    #[serde(flatten)]
    service: Service,
    average_rating: Decimal,
    reviews: Vec<Review>,
    contact_link: Option<String>,
}

async fn service_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ServiceDetail>, AppError> {
    let mut service = state
        .services
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no service with slug {}", slug)))?;

    state.services.increment_views(service.id).await?;
    service.record_view();

    let listing = ListingRef::service(service.id);
    let reviews = approved_only(state.reviews.list_for_listing(listing).await?);
    let average_rating = average_of(&reviews);

    let contact_link = service.whatsapp_number.as_deref().map(|number| {
        let url = format!("{}/services/{}", state.site.base_url, service.slug);
        whatsapp_link(number, &interest_message(&service, &url))
    });

    Ok(Json(ServiceDetail {
        service,
        average_rating,
        reviews,
        contact_link,
    }))
}

#[derive(Debug, Deserialize)]
struct ServiceForm {
    title: String,
    description: String,
    price_type: PriceType,
    /// Absent for negotiable pricing; no commission is computed then.
    vendor_price: Option<Decimal>,
    category_id: Option<Uuid>,
    location: String,
    campus: Option<String>,
    whatsapp_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatedService {
    #[serde(flatten)]
    service: Service,
    warning: Option<String>,
}

async fn create_service(
    State(state): State<AppState>,
    Auth(actor): Auth,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreatedService>), AppError> {
    let form = read_listing_form(multipart).await?;
    let spec: ServiceForm = serde_json::from_value(serde_json::Value::Object(form.fields))
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let images = upload_images(state.uploader.as_ref(), &form.images).await?;
    let (video, warning) = upload_video(state.uploader.as_ref(), form.video).await?;

    let mut service = Service::new(NewService {
        provider_id: actor.id,
        category_id: spec.category_id,
        title: spec.title,
        description: spec.description,
        price_type: spec.price_type,
        vendor_price: spec.vendor_price,
        location: spec.location,
        campus: spec.campus,
        whatsapp_number: spec.whatsapp_number,
        images,
    })?;
    if let Some(video) = video {
        service.video_url = Some(video.url);
        service.video_duration_seconds = Some(video.duration_seconds);
    }

    state.services.create(&service).await?;
    let event = ListingCreatedEvent {
        listing: service.listing_ref(),
        owner_id: service.provider_id,
        slug: service.slug.clone(),
        timestamp: service.created_at.timestamp(),
    };
    tracing::info!(
        target: "audit",
        payload = %serde_json::to_string(&event).unwrap_or_default(),
        "listing created"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatedService { service, warning }),
    ))
}

#[derive(Debug, Deserialize, Default)]
struct EditRequest {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    #[serde(default)]
    campus: Option<Option<String>>,
}

async fn edit_service(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<EditRequest>,
) -> Result<Json<Service>, AppError> {
    let mut service = get_service(&state, id).await?;
    let edit = ListingEdit {
        title: req.title,
        description: req.description,
        location: req.location,
        campus: req.campus,
        condition: None,
    };
    Lifecycle::edit_service(&mut service, edit, &actor)?;
    state.services.save(&service).await?;
    Ok(Json(service))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ServiceStatus,
}

async fn set_status(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Service>, AppError> {
    let mut service = get_service(&state, id).await?;
    Lifecycle::set_service_status(&mut service, req.status, &actor)?;
    state.services.save(&service).await?;
    Ok(Json(service))
}

async fn delete_service(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = get_service(&state, id).await?;
    Lifecycle::authorize_delete(service.provider_id, &actor)?;
    state.services.delete(service.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn get_service(state: &AppState, id: Uuid) -> Result<Service, AppError> {
    state
        .services
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("no service with id {}", id)))
}

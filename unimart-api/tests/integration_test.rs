use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use unimart_api::state::SiteSettings;
use unimart_api::{app, AppState};
use unimart_catalog::{Category, Condition, NewProduct, Product, ProductStatus, Service};
use unimart_core::repository::{
    AvailabilityReportRepository, BrowseFilter, CategoryRepository, ChangeRequestRepository,
    MessageRepository, ProductRepository, PromotionRepository, RepoError, ReviewRepository,
    ServiceRepository,
};
use unimart_core::{Message, MockUploader};
use unimart_moderation::{AvailabilityReport, ChangeRequest};
use unimart_promo::{Promotion, PromotionPackage};
use unimart_review::Review;
use unimart_shared::ListingRef;

#[derive(Default)]
struct InMemoryProducts(Mutex<HashMap<Uuid, Product>>);

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn create(&self, product: &Product) -> Result<(), RepoError> {
        self.0.lock().unwrap().insert(product.id, product.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        Ok(self.0.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn save(&self, product: &Product) -> Result<(), RepoError> {
        self.0.lock().unwrap().insert(product.id, product.clone());
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        if let Some(product) = self.0.lock().unwrap().get_mut(&id) {
            product.views += 1;
        }
        Ok(())
    }

    async fn browse(&self, filter: &BrowseFilter) -> Result<Vec<Product>, RepoError> {
        let now = Utc::now();
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == ProductStatus::Active)
            .filter(|p| {
                !filter.featured_only
                    || (p.is_featured && p.featured_until.map_or(true, |u| u > now))
            })
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryServices(Mutex<HashMap<Uuid, Service>>);

#[async_trait]
impl ServiceRepository for InMemoryServices {
    async fn create(&self, service: &Service) -> Result<(), RepoError> {
        self.0.lock().unwrap().insert(service.id, service.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>, RepoError> {
        Ok(self.0.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Service>, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .find(|s| s.slug == slug)
            .cloned())
    }

    async fn save(&self, service: &Service) -> Result<(), RepoError> {
        self.0.lock().unwrap().insert(service.id, service.clone());
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        if let Some(service) = self.0.lock().unwrap().get_mut(&id) {
            service.views += 1;
        }
        Ok(())
    }

    async fn browse(&self, _filter: &BrowseFilter) -> Result<Vec<Service>, RepoError> {
        Ok(self.0.lock().unwrap().values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryCategories(Mutex<Vec<Category>>);

#[async_trait]
impl CategoryRepository for InMemoryCategories {
    async fn create(&self, category: &Category) -> Result<(), RepoError> {
        self.0.lock().unwrap().push(category.clone());
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryReviews(Mutex<Vec<Review>>);

#[async_trait]
impl ReviewRepository for InMemoryReviews {
    async fn create(&self, review: &Review) -> Result<(), RepoError> {
        self.0.lock().unwrap().push(review.clone());
        Ok(())
    }

    async fn find_by_reviewer(
        &self,
        listing: ListingRef,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.listing == listing && r.reviewer_id == reviewer_id)
            .cloned())
    }

    async fn list_for_listing(&self, listing: ListingRef) -> Result<Vec<Review>, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.listing == listing)
            .cloned()
            .collect())
    }

    async fn set_approved(&self, review_ids: &[Uuid], approved: bool) -> Result<u64, RepoError> {
        let mut count = 0;
        for review in self.0.lock().unwrap().iter_mut() {
            if review_ids.contains(&review.id) {
                review.is_approved = approved;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[derive(Default)]
struct InMemoryPromotions {
    promotions: Mutex<HashMap<Uuid, Promotion>>,
    packages: Mutex<Vec<PromotionPackage>>,
}

#[async_trait]
impl PromotionRepository for InMemoryPromotions {
    async fn create(&self, promotion: &Promotion) -> Result<(), RepoError> {
        self.promotions
            .lock()
            .unwrap()
            .insert(promotion.id, promotion.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Promotion>, RepoError> {
        Ok(self.promotions.lock().unwrap().get(&id).cloned())
    }

    async fn save_with_listing(
        &self,
        promotion: &Promotion,
        _listing: ListingRef,
        _is_featured: bool,
        _featured_until: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError> {
        self.create(promotion).await
    }

    async fn save(&self, promotion: &Promotion) -> Result<(), RepoError> {
        self.create(promotion).await
    }

    async fn list_packages(&self) -> Result<Vec<PromotionPackage>, RepoError> {
        Ok(self.packages.lock().unwrap().clone())
    }

    async fn get_package(&self, id: Uuid) -> Result<Option<PromotionPackage>, RepoError> {
        Ok(self
            .packages
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

#[derive(Default)]
struct InMemoryChangeRequests(Mutex<HashMap<Uuid, ChangeRequest>>);

#[async_trait]
impl ChangeRequestRepository for InMemoryChangeRequests {
    async fn create(&self, request: &ChangeRequest) -> Result<(), RepoError> {
        self.0.lock().unwrap().insert(request.id, request.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ChangeRequest>, RepoError> {
        Ok(self.0.lock().unwrap().get(&id).cloned())
    }

    async fn save_with_product(
        &self,
        request: &ChangeRequest,
        _product: &Product,
    ) -> Result<(), RepoError> {
        self.create(request).await
    }

    async fn save(&self, request: &ChangeRequest) -> Result<(), RepoError> {
        self.create(request).await
    }

    async fn list_pending(&self) -> Result<Vec<ChangeRequest>, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.is_pending())
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct InMemoryReports(Mutex<HashMap<Uuid, AvailabilityReport>>);

#[async_trait]
impl AvailabilityReportRepository for InMemoryReports {
    async fn create(&self, report: &AvailabilityReport) -> Result<(), RepoError> {
        self.0.lock().unwrap().insert(report.id, report.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AvailabilityReport>, RepoError> {
        Ok(self.0.lock().unwrap().get(&id).cloned())
    }

    async fn save(&self, report: &AvailabilityReport) -> Result<(), RepoError> {
        self.0.lock().unwrap().insert(report.id, report.clone());
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryMessages(Mutex<Vec<Message>>);

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn create(&self, message: &Message) -> Result<(), RepoError> {
        self.0.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn inbox(&self, recipient_id: Uuid) -> Result<Vec<Message>, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.recipient_id == recipient_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<(), RepoError> {
        for message in self.0.lock().unwrap().iter_mut() {
            if message.id == id && message.recipient_id == recipient_id {
                message.mark_read();
            }
        }
        Ok(())
    }

    async fn unread_count(&self, recipient_id: Uuid) -> Result<u64, RepoError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.recipient_id == recipient_id && !m.is_read)
            .count() as u64)
    }
}

struct Fixture {
    state: AppState,
    products: Arc<InMemoryProducts>,
    promotions: Arc<InMemoryPromotions>,
}

fn fixture() -> Fixture {
    let products = Arc::new(InMemoryProducts::default());
    let promotions = Arc::new(InMemoryPromotions::default());
    let state = AppState {
        products: products.clone(),
        services: Arc::new(InMemoryServices::default()),
        categories: Arc::new(InMemoryCategories::default()),
        reviews: Arc::new(InMemoryReviews::default()),
        promotions: promotions.clone(),
        change_requests: Arc::new(InMemoryChangeRequests::default()),
        reports: Arc::new(InMemoryReports::default()),
        messages: Arc::new(InMemoryMessages::default()),
        uploader: Arc::new(MockUploader::default()),
        site: SiteSettings {
            base_url: "https://unimart.test".to_string(),
            admin_whatsapp: "2348000000000".to_string(),
        },
    };
    Fixture {
        state,
        products,
        promotions,
    }
}

fn sample_product(seller_id: Uuid, status: ProductStatus) -> Product {
    let mut product = Product::new(NewProduct {
        seller_id,
        category_id: None,
        title: "iPhone 13".to_string(),
        description: "Lightly used, unlocked".to_string(),
        vendor_price: dec!(8000),
        condition: Condition::Good,
        location: "Hostel B".to_string(),
        campus: None,
        whatsapp_number: Some("2348012345678".to_string()),
        images: vec!["https://img/1.jpg".into(), "https://img/2.jpg".into()],
    })
    .unwrap();
    product.status = status;
    product
}

fn authed(
    builder: axum::http::request::Builder,
    user_id: Uuid,
    staff: bool,
) -> axum::http::request::Builder {
    builder
        .header("x-user-id", user_id.to_string())
        .header("x-username", "chidi")
        .header("x-user-staff", if staff { "true" } else { "false" })
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn browse_lists_only_active_products() {
    let fx = fixture();
    let seller = Uuid::new_v4();
    fx.products
        .create(&sample_product(seller, ProductStatus::Active))
        .await
        .unwrap();
    fx.products
        .create(&sample_product(seller, ProductStatus::Pending))
        .await
        .unwrap();

    let response = app(fx.state)
        .oneshot(Request::get("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["status"], "ACTIVE");
}

#[tokio::test]
async fn detail_fetches_count_as_views() {
    let fx = fixture();
    let product = sample_product(Uuid::new_v4(), ProductStatus::Active);
    let slug = product.slug.clone();
    fx.products.create(&product).await.unwrap();

    let app = app(fx.state);
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/products/{}", slug))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = fx.products.get(product.id).await.unwrap().unwrap();
    assert_eq!(stored.views, 2);
}

#[tokio::test]
async fn detail_includes_contact_link_and_rating() {
    let fx = fixture();
    let product = sample_product(Uuid::new_v4(), ProductStatus::Active);
    let slug = product.slug.clone();
    fx.products.create(&product).await.unwrap();

    let response = app(fx.state)
        .oneshot(
            Request::get(format!("/products/{}", slug))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;

    assert_eq!(body["average_rating"], "0");
    let link = body["contact_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/2348012345678?text="));
}

#[tokio::test]
async fn second_review_from_same_user_conflicts() {
    let fx = fixture();
    let product = sample_product(Uuid::new_v4(), ProductStatus::Active);
    let product_id = product.id;
    fx.products.create(&product).await.unwrap();

    let app = app(fx.state);
    let reviewer = Uuid::new_v4();
    let path = format!("/listings/product/{}/reviews", product_id);
    let payload = json!({ "rating": 4, "comment": "solid" });

    let first = app
        .clone()
        .oneshot(
            authed(Request::post(path.as_str()), reviewer, false)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(
            authed(Request::post(path.as_str()), reviewer, false)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unapproved_reviews_are_hidden_from_readers() {
    let fx = fixture();
    let product = sample_product(Uuid::new_v4(), ProductStatus::Active);
    let product_id = product.id;
    fx.products.create(&product).await.unwrap();

    let app = app(fx.state);
    let path = format!("/listings/product/{}/reviews", product_id);

    let created = app
        .clone()
        .oneshot(
            authed(Request::post(path.as_str()), Uuid::new_v4(), false)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "rating": 2, "comment": "meh" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let review_id = json_body(created).await["id"].as_str().unwrap().to_string();

    let moderated = app
        .clone()
        .oneshot(
            authed(Request::post("/admin/reviews/approval"), Uuid::new_v4(), true)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "ids": [review_id], "approved": false }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(moderated.status(), StatusCode::OK);

    // Readers never see the unapproved review, in the list or the mean.
    let listed = app
        .oneshot(Request::get(path.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let body = json_body(listed).await;
    assert_eq!(body["reviews"].as_array().unwrap().len(), 0);
    assert_eq!(body["average_rating"], "0");
}

#[tokio::test]
async fn promotion_request_returns_admin_chat_link() {
    let fx = fixture();
    let seller = Uuid::new_v4();
    let product = sample_product(seller, ProductStatus::Active);
    let product_id = product.id;
    fx.products.create(&product).await.unwrap();

    let package = PromotionPackage::new(
        "Weekly boost".into(),
        7,
        dec!(1000),
        "7 days featured".into(),
    );
    let package_id = package.id;
    fx.promotions.packages.lock().unwrap().push(package);

    let payload = json!({
        "listing_kind": "PRODUCT",
        "listing_id": product_id,
        "package_id": package_id,
    });
    let response = app(fx.state)
        .oneshot(
            authed(Request::post("/promotions"), seller, false)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["status"], "PENDING");
    let link = body["payment_link"].as_str().unwrap();
    assert!(link.starts_with("https://wa.me/2348000000000?text="));
}

#[tokio::test]
async fn admin_routes_reject_non_staff() {
    let fx = fixture();
    let payload = json!({ "ids": [Uuid::new_v4()] });
    let response = app(fx.state)
        .oneshot(
            authed(
                Request::post("/admin/change-requests/approve"),
                Uuid::new_v4(),
                false,
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn anonymous_mutations_are_unauthorized() {
    let fx = fixture();
    let response = app(fx.state)
        .oneshot(Request::post("/products").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

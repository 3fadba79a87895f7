use async_trait::async_trait;
use rust_decimal::Decimal;
use unimart_shared::ListingRef;
use uuid::Uuid;

use unimart_catalog::{Category, Condition, Product, Service};
use unimart_moderation::{AvailabilityReport, ChangeRequest};
use unimart_promo::{Promotion, PromotionPackage};
use unimart_review::Review;

use crate::messaging::Message;

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Filter predicate for browsing listings. All fields are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub query: Option<String>,
    pub category_id: Option<Uuid>,
    pub campus: Option<String>,
    /// Products only; services carry no condition.
    pub condition: Option<Condition>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub featured_only: bool,
    pub page: u32,
    pub page_size: u32,
}

/// Repository trait for product listings.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &Product) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Product>, RepoError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepoError>;

    /// Persist the full row; derived pricing fields travel with it in one
    /// transaction.
    async fn save(&self, product: &Product) -> Result<(), RepoError>;

    /// Single-statement atomic `views = views + 1`.
    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;

    async fn browse(&self, filter: &BrowseFilter) -> Result<Vec<Product>, RepoError>;

    /// Hard delete; the schema cascades to dependent rows.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Repository trait for service listings.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn create(&self, service: &Service) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Service>, RepoError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Service>, RepoError>;

    async fn save(&self, service: &Service) -> Result<(), RepoError>;

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError>;

    async fn browse(&self, filter: &BrowseFilter) -> Result<Vec<Service>, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: &Category) -> Result<(), RepoError>;

    async fn list_active(&self) -> Result<Vec<Category>, RepoError>;

    /// Listing references to the category null out; nothing cascades.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, review: &Review) -> Result<(), RepoError>;

    async fn find_by_reviewer(
        &self,
        listing: ListingRef,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, RepoError>;

    async fn list_for_listing(&self, listing: ListingRef) -> Result<Vec<Review>, RepoError>;

    async fn set_approved(&self, review_ids: &[Uuid], approved: bool) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait PromotionRepository: Send + Sync {
    async fn create(&self, promotion: &Promotion) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<Promotion>, RepoError>;

    /// Persist the promotion and the listing's featuring fields in one
    /// transaction (activation side effect must not partially land).
    async fn save_with_listing(
        &self,
        promotion: &Promotion,
        listing: ListingRef,
        is_featured: bool,
        featured_until: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<(), RepoError>;

    async fn save(&self, promotion: &Promotion) -> Result<(), RepoError>;

    async fn list_packages(&self) -> Result<Vec<PromotionPackage>, RepoError>;

    async fn get_package(&self, id: Uuid) -> Result<Option<PromotionPackage>, RepoError>;
}

#[async_trait]
pub trait ChangeRequestRepository: Send + Sync {
    async fn create(&self, request: &ChangeRequest) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<ChangeRequest>, RepoError>;

    /// Persist an approved request together with the mutated product, one
    /// transaction per request.
    async fn save_with_product(
        &self,
        request: &ChangeRequest,
        product: &Product,
    ) -> Result<(), RepoError>;

    async fn save(&self, request: &ChangeRequest) -> Result<(), RepoError>;

    async fn list_pending(&self) -> Result<Vec<ChangeRequest>, RepoError>;
}

#[async_trait]
pub trait AvailabilityReportRepository: Send + Sync {
    /// Insert the report and bump the product's counter together.
    async fn create(&self, report: &AvailabilityReport) -> Result<(), RepoError>;

    async fn get(&self, id: Uuid) -> Result<Option<AvailabilityReport>, RepoError>;

    async fn save(&self, report: &AvailabilityReport) -> Result<(), RepoError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> Result<(), RepoError>;

    async fn inbox(&self, recipient_id: Uuid) -> Result<Vec<Message>, RepoError>;

    async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<(), RepoError>;

    async fn unread_count(&self, recipient_id: Uuid) -> Result<u64, RepoError>;
}

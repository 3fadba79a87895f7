use std::sync::Arc;

use unimart_core::repository::{
    AvailabilityReportRepository, CategoryRepository, ChangeRequestRepository, MessageRepository,
    ProductRepository, PromotionRepository, ReviewRepository, ServiceRepository,
};
use unimart_core::MediaUploader;

/// Storefront settings resolved once at startup.
#[derive(Clone)]
pub struct SiteSettings {
    /// Public base URL, used when listing links are embedded in messages.
    pub base_url: String,
    /// WhatsApp contact promotion requests are routed to.
    pub admin_whatsapp: String,
}

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
    pub promotions: Arc<dyn PromotionRepository>,
    pub change_requests: Arc<dyn ChangeRequestRepository>,
    pub reports: Arc<dyn AvailabilityReportRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub uploader: Arc<dyn MediaUploader>,
    pub site: SiteSettings,
}

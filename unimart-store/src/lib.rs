pub mod app_config;
pub mod codec;
pub mod database;
pub mod listing_repo;
pub mod message_repo;
pub mod moderation_repo;
pub mod promo_repo;
pub mod review_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use listing_repo::{PgCategoryRepository, PgProductRepository, PgServiceRepository};
pub use message_repo::PgMessageRepository;
pub use moderation_repo::{PgAvailabilityReportRepository, PgChangeRequestRepository};
pub use promo_repo::PgPromotionRepository;
pub use review_repo::PgReviewRepository;

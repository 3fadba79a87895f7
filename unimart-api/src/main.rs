use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unimart_api::{app, state::SiteSettings, AppState};
use unimart_core::MockUploader;
use unimart_store::{
    Config, DbClient, PgAvailabilityReportRepository, PgCategoryRepository,
    PgChangeRequestRepository, PgMessageRepository, PgProductRepository, PgPromotionRepository,
    PgReviewRepository, PgServiceRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "unimart_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load config")?;
    tracing::info!("Starting UniMart API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .context("failed to connect to Postgres")?;
    db.migrate().await.context("failed to run migrations")?;
    let pool = db.pool.clone();

    // TODO: swap for the CDN-backed uploader once the media host is
    // provisioned.
    let uploader = Arc::new(MockUploader::default());

    let app_state = AppState {
        products: Arc::new(PgProductRepository::new(pool.clone())),
        services: Arc::new(PgServiceRepository::new(pool.clone())),
        categories: Arc::new(PgCategoryRepository::new(pool.clone())),
        reviews: Arc::new(PgReviewRepository::new(pool.clone())),
        promotions: Arc::new(PgPromotionRepository::new(pool.clone())),
        change_requests: Arc::new(PgChangeRequestRepository::new(pool.clone())),
        reports: Arc::new(PgAvailabilityReportRepository::new(pool.clone())),
        messages: Arc::new(PgMessageRepository::new(pool)),
        uploader,
        site: SiteSettings {
            base_url: config.site.base_url.clone(),
            admin_whatsapp: config.admin.whatsapp_number.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

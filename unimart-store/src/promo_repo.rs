use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use unimart_core::repository::{PromotionRepository, RepoError};
use unimart_promo::{Promotion, PromotionPackage};
use unimart_shared::{ListingKind, ListingRef};

use crate::codec;

pub struct PgPromotionRepository {
    pool: PgPool,
}

impl PgPromotionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PromotionRow {
    id: Uuid,
    listing_kind: String,
    listing_id: Uuid,
    package_id: Option<Uuid>,
    amount_paid: Decimal,
    status: String,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl PromotionRow {
    fn into_promotion(self) -> Result<Promotion, RepoError> {
        Ok(Promotion {
            id: self.id,
            listing: codec::parse_listing_ref(&self.listing_kind, self.listing_id)?,
            package_id: self.package_id,
            amount_paid: self.amount_paid,
            status: codec::parse_promotion_status(&self.status)?,
            start_date: self.start_date,
            end_date: self.end_date,
            payment_reference: self.payment_reference,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    name: String,
    duration_days: i32,
    price: Decimal,
    description: String,
    is_active: bool,
}

impl From<PackageRow> for PromotionPackage {
    fn from(row: PackageRow) -> Self {
        PromotionPackage {
            id: row.id,
            name: row.name,
            duration_days: row.duration_days as u32,
            price: row.price,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

async fn upsert_promotion(
    tx: &mut Transaction<'_, Postgres>,
    promotion: &Promotion,
) -> Result<(), RepoError> {
    let (kind, listing_id) = codec::listing_ref_columns(promotion.listing);
    sqlx::query(
        r#"
        INSERT INTO promotions (
            id, listing_kind, listing_id, package_id, amount_paid, status,
            start_date, end_date, payment_reference, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            start_date = EXCLUDED.start_date,
            end_date = EXCLUDED.end_date,
            payment_reference = EXCLUDED.payment_reference
        "#,
    )
    .bind(promotion.id)
    .bind(kind)
    .bind(listing_id)
    .bind(promotion.package_id)
    .bind(promotion.amount_paid)
    .bind(codec::promotion_status_str(promotion.status))
    .bind(promotion.start_date)
    .bind(promotion.end_date)
    .bind(&promotion.payment_reference)
    .bind(promotion.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl PromotionRepository for PgPromotionRepository {
    async fn create(&self, promotion: &Promotion) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;
        upsert_promotion(&mut tx, promotion).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Promotion>, RepoError> {
        let row = sqlx::query_as::<_, PromotionRow>("SELECT * FROM promotions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(PromotionRow::into_promotion).transpose()
    }

    async fn save_with_listing(
        &self,
        promotion: &Promotion,
        listing: ListingRef,
        is_featured: bool,
        featured_until: Option<DateTime<Utc>>,
    ) -> Result<(), RepoError> {
        // Activation must land atomically: the promotion row and the
        // listing's featuring fields commit or roll back together.
        let mut tx = self.pool.begin().await?;
        upsert_promotion(&mut tx, promotion).await?;

        let table = match listing.kind {
            ListingKind::Product => "products",
            ListingKind::Service => "services",
        };
        sqlx::query(&format!(
            "UPDATE {} SET is_featured = $2, featured_until = $3, updated_at = NOW() WHERE id = $1",
            table
        ))
        .bind(listing.id)
        .bind(is_featured)
        .bind(featured_until)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(
            promotion_id = %promotion.id,
            listing = %listing,
            is_featured,
            "promotion persisted with listing featuring"
        );
        Ok(())
    }

    async fn save(&self, promotion: &Promotion) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;
        upsert_promotion(&mut tx, promotion).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_packages(&self) -> Result<Vec<PromotionPackage>, RepoError> {
        let rows = sqlx::query_as::<_, PackageRow>(
            "SELECT * FROM promotion_packages WHERE is_active ORDER BY duration_days",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PromotionPackage::from).collect())
    }

    async fn get_package(&self, id: Uuid) -> Result<Option<PromotionPackage>, RepoError> {
        let row =
            sqlx::query_as::<_, PackageRow>("SELECT * FROM promotion_packages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(PromotionPackage::from))
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use unimart_core::repository::{RepoError, ReviewRepository};
use unimart_review::Review;
use unimart_shared::ListingRef;

use crate::codec;

pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    listing_kind: String,
    listing_id: Uuid,
    reviewer_id: Uuid,
    rating: i16,
    comment: String,
    is_verified_purchase: bool,
    is_approved: bool,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review, RepoError> {
        Ok(Review {
            id: self.id,
            listing: codec::parse_listing_ref(&self.listing_kind, self.listing_id)?,
            reviewer_id: self.reviewer_id,
            rating: self.rating as u8,
            comment: self.comment,
            is_verified_purchase: self.is_verified_purchase,
            is_approved: self.is_approved,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn create(&self, review: &Review) -> Result<(), RepoError> {
        let (kind, listing_id) = codec::listing_ref_columns(review.listing);
        sqlx::query(
            r#"
            INSERT INTO reviews (
                id, listing_kind, listing_id, reviewer_id, rating, comment,
                is_verified_purchase, is_approved, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(review.id)
        .bind(kind)
        .bind(listing_id)
        .bind(review.reviewer_id)
        .bind(review.rating as i16)
        .bind(&review.comment)
        .bind(review.is_verified_purchase)
        .bind(review.is_approved)
        .bind(review.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_reviewer(
        &self,
        listing: ListingRef,
        reviewer_id: Uuid,
    ) -> Result<Option<Review>, RepoError> {
        let (kind, listing_id) = codec::listing_ref_columns(listing);
        let row = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews
             WHERE listing_kind = $1 AND listing_id = $2 AND reviewer_id = $3",
        )
        .bind(kind)
        .bind(listing_id)
        .bind(reviewer_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ReviewRow::into_review).transpose()
    }

    async fn list_for_listing(&self, listing: ListingRef) -> Result<Vec<Review>, RepoError> {
        let (kind, listing_id) = codec::listing_ref_columns(listing);
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT * FROM reviews
             WHERE listing_kind = $1 AND listing_id = $2
             ORDER BY created_at DESC",
        )
        .bind(kind)
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    async fn set_approved(&self, review_ids: &[Uuid], approved: bool) -> Result<u64, RepoError> {
        let result = sqlx::query("UPDATE reviews SET is_approved = $2 WHERE id = ANY($1)")
            .bind(review_ids)
            .bind(approved)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

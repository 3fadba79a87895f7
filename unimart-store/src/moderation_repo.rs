use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use unimart_catalog::Product;
use unimart_core::repository::{
    AvailabilityReportRepository, ChangeRequestRepository, RepoError,
};
use unimart_moderation::{AvailabilityReport, ChangePayload, ChangeRequest};

use crate::codec;

pub struct PgChangeRequestRepository {
    pool: PgPool,
}

impl PgChangeRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ChangeRequestRow {
    id: Uuid,
    product_id: Uuid,
    requester_id: Uuid,
    request_type: String,
    current_price: Option<Decimal>,
    requested_price: Option<Decimal>,
    new_images: Option<Json<Vec<String>>>,
    reason: String,
    status: String,
    admin_note: Option<String>,
    created_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
    reviewed_by: Option<Uuid>,
}

impl ChangeRequestRow {
    fn into_request(self) -> Result<ChangeRequest, RepoError> {
        let payload = match self.request_type.as_str() {
            "price" => match (self.current_price, self.requested_price) {
                (Some(current_price), Some(requested_price)) => ChangePayload::Price {
                    current_price,
                    requested_price,
                },
                _ => {
                    return Err(format!(
                        "price change request {} is missing its price columns",
                        self.id
                    )
                    .into())
                }
            },
            "images" => match self.new_images {
                Some(Json(new_images)) => ChangePayload::Images { new_images },
                None => {
                    return Err(format!(
                        "image change request {} is missing its image list",
                        self.id
                    )
                    .into())
                }
            },
            other => return Err(format!("unknown change request type: {}", other).into()),
        };
        Ok(ChangeRequest {
            id: self.id,
            product_id: self.product_id,
            requester_id: self.requester_id,
            payload,
            reason: self.reason,
            status: codec::parse_change_status(&self.status)?,
            admin_note: self.admin_note,
            created_at: self.created_at,
            reviewed_at: self.reviewed_at,
            reviewed_by: self.reviewed_by,
        })
    }
}

fn payload_columns(
    payload: &ChangePayload,
) -> (Option<Decimal>, Option<Decimal>, Option<Json<Vec<String>>>) {
    match payload {
        ChangePayload::Price {
            current_price,
            requested_price,
        } => (Some(*current_price), Some(*requested_price), None),
        ChangePayload::Images { new_images } => (None, None, Some(Json(new_images.clone()))),
    }
}

async fn upsert_request(
    tx: &mut Transaction<'_, Postgres>,
    request: &ChangeRequest,
) -> Result<(), RepoError> {
    let (current_price, requested_price, new_images) = payload_columns(&request.payload);
    sqlx::query(
        r#"
        INSERT INTO change_requests (
            id, product_id, requester_id, request_type, current_price,
            requested_price, new_images, reason, status, admin_note,
            created_at, reviewed_at, reviewed_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            admin_note = EXCLUDED.admin_note,
            reviewed_at = EXCLUDED.reviewed_at,
            reviewed_by = EXCLUDED.reviewed_by
        "#,
    )
    .bind(request.id)
    .bind(request.product_id)
    .bind(request.requester_id)
    .bind(request.payload.kind())
    .bind(current_price)
    .bind(requested_price)
    .bind(new_images)
    .bind(&request.reason)
    .bind(codec::change_status_str(request.status))
    .bind(&request.admin_note)
    .bind(request.created_at)
    .bind(request.reviewed_at)
    .bind(request.reviewed_by)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl ChangeRequestRepository for PgChangeRequestRepository {
    async fn create(&self, request: &ChangeRequest) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;
        upsert_request(&mut tx, request).await?;
        tx.commit().await?;
        tracing::info!(
            request_id = %request.id,
            product_id = %request.product_id,
            request_type = request.payload.kind(),
            "change request opened"
        );
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ChangeRequest>, RepoError> {
        let row =
            sqlx::query_as::<_, ChangeRequestRow>("SELECT * FROM change_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(ChangeRequestRow::into_request).transpose()
    }

    async fn save_with_product(
        &self,
        request: &ChangeRequest,
        product: &Product,
    ) -> Result<(), RepoError> {
        // An approval writes the request stamps and the mutated product in
        // one transaction.
        let mut tx = self.pool.begin().await?;
        upsert_request(&mut tx, request).await?;

        let [image1, image2, image3] = product.images.clone().into_columns();
        sqlx::query(
            r#"
            UPDATE products SET
                vendor_price = $2, commission_rate = $3, price = $4,
                image1 = $5, image2 = $6, image3 = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(product.vendor_price)
        .bind(product.commission_rate)
        .bind(product.price)
        .bind(image1)
        .bind(image2)
        .bind(image3)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn save(&self, request: &ChangeRequest) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;
        upsert_request(&mut tx, request).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<ChangeRequest>, RepoError> {
        let rows = sqlx::query_as::<_, ChangeRequestRow>(
            "SELECT * FROM change_requests WHERE status = 'pending' ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ChangeRequestRow::into_request).collect()
    }
}

pub struct PgAvailabilityReportRepository {
    pool: PgPool,
}

impl PgAvailabilityReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    product_id: Uuid,
    reporter_id: Uuid,
    reason: String,
    is_resolved: bool,
    admin_note: Option<String>,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl From<ReportRow> for AvailabilityReport {
    fn from(row: ReportRow) -> Self {
        AvailabilityReport {
            id: row.id,
            product_id: row.product_id,
            reporter_id: row.reporter_id,
            reason: row.reason,
            is_resolved: row.is_resolved,
            admin_note: row.admin_note,
            created_at: row.created_at,
            resolved_at: row.resolved_at,
        }
    }
}

#[async_trait]
impl AvailabilityReportRepository for PgAvailabilityReportRepository {
    async fn create(&self, report: &AvailabilityReport) -> Result<(), RepoError> {
        // The product's report counter moves with the insert.
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO availability_reports (
                id, product_id, reporter_id, reason, is_resolved, admin_note,
                created_at, resolved_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(report.id)
        .bind(report.product_id)
        .bind(report.reporter_id)
        .bind(&report.reason)
        .bind(report.is_resolved)
        .bind(&report.admin_note)
        .bind(report.created_at)
        .bind(report.resolved_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "UPDATE products SET availability_reports = availability_reports + 1 WHERE id = $1",
        )
        .bind(report.product_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<AvailabilityReport>, RepoError> {
        let row =
            sqlx::query_as::<_, ReportRow>("SELECT * FROM availability_reports WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(AvailabilityReport::from))
    }

    async fn save(&self, report: &AvailabilityReport) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE availability_reports SET
                is_resolved = $2, admin_note = $3, resolved_at = $4
            WHERE id = $1
            "#,
        )
        .bind(report.id)
        .bind(report.is_resolved)
        .bind(&report.admin_note)
        .bind(report.resolved_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

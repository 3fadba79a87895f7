use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use unimart_catalog::{Category, ImageSlots, Product, Service};
use unimart_core::repository::{
    BrowseFilter, CategoryRepository, ProductRepository, RepoError, ServiceRepository,
};

use crate::codec;

pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    seller_id: Uuid,
    category_id: Option<Uuid>,
    title: String,
    slug: String,
    description: String,
    vendor_price: Decimal,
    commission_rate: Decimal,
    price: Decimal,
    condition: String,
    location: String,
    campus: Option<String>,
    whatsapp_number: Option<String>,
    image1: Option<String>,
    image2: Option<String>,
    image3: Option<String>,
    video_url: Option<String>,
    video_duration_seconds: Option<i32>,
    status: String,
    is_featured: bool,
    featured_until: Option<DateTime<Utc>>,
    views: i32,
    availability_reports: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepoError> {
        Ok(Product {
            id: self.id,
            seller_id: self.seller_id,
            category_id: self.category_id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            vendor_price: self.vendor_price,
            commission_rate: self.commission_rate,
            price: self.price,
            condition: codec::parse_condition(&self.condition)?,
            location: self.location,
            campus: self.campus,
            whatsapp_number: self.whatsapp_number,
            images: ImageSlots::from_columns([self.image1, self.image2, self.image3]),
            video_url: self.video_url,
            video_duration_seconds: self.video_duration_seconds.map(|d| d as u32),
            status: codec::parse_product_status(&self.status)?,
            is_featured: self.is_featured,
            featured_until: self.featured_until,
            views: self.views as u32,
            availability_reports: self.availability_reports as u32,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn image_columns(images: &ImageSlots) -> [Option<String>; 3] {
    images.clone().into_columns()
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: &Product) -> Result<(), RepoError> {
        let [image1, image2, image3] = image_columns(&product.images);
        sqlx::query(
            r#"
            INSERT INTO products (
                id, seller_id, category_id, title, slug, description,
                vendor_price, commission_rate, price, condition, location,
                campus, whatsapp_number, image1, image2, image3, video_url,
                video_duration_seconds, status, is_featured, featured_until,
                views, availability_reports, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            "#,
        )
        .bind(product.id)
        .bind(product.seller_id)
        .bind(product.category_id)
        .bind(&product.title)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.vendor_price)
        .bind(product.commission_rate)
        .bind(product.price)
        .bind(codec::condition_str(product.condition))
        .bind(&product.location)
        .bind(&product.campus)
        .bind(&product.whatsapp_number)
        .bind(image1)
        .bind(image2)
        .bind(image3)
        .bind(&product.video_url)
        .bind(product.video_duration_seconds.map(|d| d as i32))
        .bind(codec::product_status_str(product.status))
        .bind(product.is_featured)
        .bind(product.featured_until)
        .bind(product.views as i32)
        .bind(product.availability_reports as i32)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(product_id = %product.id, slug = %product.slug, "product created");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ProductRow::into_product).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepoError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ProductRow::into_product).transpose()
    }

    async fn save(&self, product: &Product) -> Result<(), RepoError> {
        let [image1, image2, image3] = image_columns(&product.images);
        // One statement carries the pricing triple and everything else, so
        // derived fields can never land without their source.
        sqlx::query(
            r#"
            UPDATE products SET
                category_id = $2, title = $3, description = $4,
                vendor_price = $5, commission_rate = $6, price = $7,
                condition = $8, location = $9, campus = $10,
                whatsapp_number = $11, image1 = $12, image2 = $13,
                image3 = $14, video_url = $15, video_duration_seconds = $16,
                status = $17, is_featured = $18, featured_until = $19,
                availability_reports = $20, updated_at = $21
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(product.category_id)
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.vendor_price)
        .bind(product.commission_rate)
        .bind(product.price)
        .bind(codec::condition_str(product.condition))
        .bind(&product.location)
        .bind(&product.campus)
        .bind(&product.whatsapp_number)
        .bind(image1)
        .bind(image2)
        .bind(image3)
        .bind(&product.video_url)
        .bind(product.video_duration_seconds.map(|d| d as i32))
        .bind(codec::product_status_str(product.status))
        .bind(product.is_featured)
        .bind(product.featured_until)
        .bind(product.availability_reports as i32)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE products SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn browse(&self, filter: &BrowseFilter) -> Result<Vec<Product>, RepoError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM products WHERE status = 'active'");
        if let Some(condition) = filter.condition {
            qb.push(" AND condition = ");
            qb.push_bind(codec::condition_str(condition));
        }
        apply_browse_filter(&mut qb, filter);

        let rows = qb
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Polymorphic references can't cascade in the schema; delete them
        // in the same transaction as the listing row.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM reviews WHERE listing_kind = 'product' AND listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM promotions WHERE listing_kind = 'product' AND listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM messages WHERE listing_kind = 'product' AND listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

fn apply_browse_filter(qb: &mut QueryBuilder<Postgres>, filter: &BrowseFilter) {
    if let Some(query) = &filter.query {
        let pattern = format!("%{}%", query);
        qb.push(" AND (title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND category_id = ");
        qb.push_bind(category_id);
    }
    if let Some(campus) = &filter.campus {
        qb.push(" AND campus = ");
        qb.push_bind(campus.clone());
    }
    if let Some(min_price) = filter.min_price {
        qb.push(" AND price >= ");
        qb.push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        qb.push(" AND price <= ");
        qb.push_bind(max_price);
    }
    if filter.featured_only {
        qb.push(" AND is_featured AND (featured_until IS NULL OR featured_until > NOW())");
    }

    let page_size = if filter.page_size == 0 {
        20
    } else {
        filter.page_size.min(100)
    };
    qb.push(" ORDER BY created_at DESC LIMIT ");
    qb.push_bind(page_size as i64);
    qb.push(" OFFSET ");
    qb.push_bind(i64::from(filter.page) * i64::from(page_size));
}

pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    provider_id: Uuid,
    category_id: Option<Uuid>,
    title: String,
    slug: String,
    description: String,
    price_type: String,
    vendor_price: Option<Decimal>,
    commission_rate: Option<Decimal>,
    price: Option<Decimal>,
    location: String,
    campus: Option<String>,
    whatsapp_number: Option<String>,
    image1: Option<String>,
    image2: Option<String>,
    image3: Option<String>,
    video_url: Option<String>,
    video_duration_seconds: Option<i32>,
    status: String,
    is_featured: bool,
    featured_until: Option<DateTime<Utc>>,
    views: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_service(self) -> Result<Service, RepoError> {
        Ok(Service {
            id: self.id,
            provider_id: self.provider_id,
            category_id: self.category_id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            price_type: codec::parse_price_type(&self.price_type)?,
            vendor_price: self.vendor_price,
            commission_rate: self.commission_rate,
            price: self.price,
            location: self.location,
            campus: self.campus,
            whatsapp_number: self.whatsapp_number,
            images: ImageSlots::from_columns([self.image1, self.image2, self.image3]),
            video_url: self.video_url,
            video_duration_seconds: self.video_duration_seconds.map(|d| d as u32),
            status: codec::parse_service_status(&self.status)?,
            is_featured: self.is_featured,
            featured_until: self.featured_until,
            views: self.views as u32,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn create(&self, service: &Service) -> Result<(), RepoError> {
        let [image1, image2, image3] = image_columns(&service.images);
        sqlx::query(
            r#"
            INSERT INTO services (
                id, provider_id, category_id, title, slug, description,
                price_type, vendor_price, commission_rate, price, location,
                campus, whatsapp_number, image1, image2, image3, video_url,
                video_duration_seconds, status, is_featured, featured_until,
                views, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24)
            "#,
        )
        .bind(service.id)
        .bind(service.provider_id)
        .bind(service.category_id)
        .bind(&service.title)
        .bind(&service.slug)
        .bind(&service.description)
        .bind(codec::price_type_str(service.price_type))
        .bind(service.vendor_price)
        .bind(service.commission_rate)
        .bind(service.price)
        .bind(&service.location)
        .bind(&service.campus)
        .bind(&service.whatsapp_number)
        .bind(image1)
        .bind(image2)
        .bind(image3)
        .bind(&service.video_url)
        .bind(service.video_duration_seconds.map(|d| d as i32))
        .bind(codec::service_status_str(service.status))
        .bind(service.is_featured)
        .bind(service.featured_until)
        .bind(service.views as i32)
        .bind(service.created_at)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(service_id = %service.id, slug = %service.slug, "service created");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>, RepoError> {
        let row = sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ServiceRow::into_service).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Service>, RepoError> {
        let row = sqlx::query_as::<_, ServiceRow>("SELECT * FROM services WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(ServiceRow::into_service).transpose()
    }

    async fn save(&self, service: &Service) -> Result<(), RepoError> {
        let [image1, image2, image3] = image_columns(&service.images);
        sqlx::query(
            r#"
            UPDATE services SET
                category_id = $2, title = $3, description = $4,
                price_type = $5, vendor_price = $6, commission_rate = $7,
                price = $8, location = $9, campus = $10,
                whatsapp_number = $11, image1 = $12, image2 = $13,
                image3 = $14, video_url = $15, video_duration_seconds = $16,
                status = $17, is_featured = $18, featured_until = $19,
                updated_at = $20
            WHERE id = $1
            "#,
        )
        .bind(service.id)
        .bind(service.category_id)
        .bind(&service.title)
        .bind(&service.description)
        .bind(codec::price_type_str(service.price_type))
        .bind(service.vendor_price)
        .bind(service.commission_rate)
        .bind(service.price)
        .bind(&service.location)
        .bind(&service.campus)
        .bind(&service.whatsapp_number)
        .bind(image1)
        .bind(image2)
        .bind(image3)
        .bind(&service.video_url)
        .bind(service.video_duration_seconds.map(|d| d as i32))
        .bind(codec::service_status_str(service.status))
        .bind(service.is_featured)
        .bind(service.featured_until)
        .bind(service.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("UPDATE services SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn browse(&self, filter: &BrowseFilter) -> Result<Vec<Service>, RepoError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM services WHERE status = 'active'");
        apply_browse_filter(&mut qb, filter);

        let rows = qb
            .build_query_as::<ServiceRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ServiceRow::into_service).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM reviews WHERE listing_kind = 'service' AND listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM promotions WHERE listing_kind = 'service' AND listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM messages WHERE listing_kind = 'service' AND listing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(service_id = %id, "service deleted");
        Ok(())
    }
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    icon: Option<String>,
    description: Option<String>,
    is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            icon: row.icon,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, category: &Category) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO categories (id, name, slug, icon, description, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.icon)
        .bind(&category.description)
        .bind(category.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Category>, RepoError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT * FROM categories WHERE is_active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Listing references null out via the schema's ON DELETE SET NULL.
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

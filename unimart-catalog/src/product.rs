use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unimart_shared::{ListingKind, ListingRef};
use uuid::Uuid;

use crate::lifecycle::slug_for;
use crate::pricing;
use crate::CatalogError;

/// Fixed number of image slots a listing carries, either variant.
pub const MAX_IMAGE_SLOTS: usize = 3;

/// Products must ship with at least this many images; services may have none.
pub const REQUIRED_PRODUCT_IMAGES: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
    ForParts,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Pending,
    Active,
    Sold,
    Inactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    Pending,
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    Fixed,
    Hourly,
    Negotiable,
}

/// Positional image storage with a declared maximum.
///
/// Change-request approval overwrites slots by index; list length is
/// validated up front rather than silently truncated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageSlots {
    slots: [Option<String>; MAX_IMAGE_SLOTS],
}

impl ImageSlots {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(urls: Vec<String>) -> Result<Self, CatalogError> {
        let mut images = Self::default();
        images.overwrite(&urls)?;
        Ok(images)
    }

    /// Replace slot i with the i-th URL. Rejects oversized lists.
    pub fn overwrite(&mut self, urls: &[String]) -> Result<(), CatalogError> {
        if urls.len() > MAX_IMAGE_SLOTS {
            return Err(CatalogError::Validation(format!(
                "at most {} images allowed, got {}",
                MAX_IMAGE_SLOTS,
                urls.len()
            )));
        }
        for (slot, url) in self.slots.iter_mut().zip(urls.iter()) {
            *slot = Some(url.clone());
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(|s| s.as_deref())
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|s| s.as_deref())
    }

    pub fn into_columns(self) -> [Option<String>; MAX_IMAGE_SLOTS] {
        self.slots
    }

    pub fn from_columns(columns: [Option<String>; MAX_IMAGE_SLOTS]) -> Self {
        Self { slots: columns }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
}

impl Category {
    pub fn new(name: String, icon: Option<String>, description: Option<String>) -> Self {
        let slug = crate::lifecycle::slugify(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            icon,
            description,
            is_active: true,
        }
    }
}

/// Shared surface of the two listing variants, for workflows (promotions,
/// reviews, messaging) that operate on either.
pub trait Listing {
    fn listing_ref(&self) -> ListingRef;
    fn owner_id(&self) -> Uuid;
    fn title(&self) -> &str;
    fn slug(&self) -> &str;
    /// Final listed price, if the listing carries one.
    fn listed_price(&self) -> Option<Decimal>;
    fn whatsapp_number(&self) -> Option<&str>;
    fn views(&self) -> u32;
    fn record_view(&mut self);
    fn set_featured(&mut self, until: Option<DateTime<Utc>>);
    fn is_currently_featured(&self, now: DateTime<Utc>) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub category_id: Option<Uuid>,

    pub title: String,
    pub slug: String,
    pub description: String,

    /// The amount the seller asked for; source of truth for commission.
    pub vendor_price: Decimal,
    /// Derived by the pricing engine, never user-editable.
    pub commission_rate: Decimal,
    /// Derived: vendor_price plus commission.
    pub price: Decimal,

    pub condition: Condition,
    pub location: String,
    pub campus: Option<String>,
    pub whatsapp_number: Option<String>,

    pub images: ImageSlots,
    pub video_url: Option<String>,
    pub video_duration_seconds: Option<u32>,

    pub status: ProductStatus,
    pub is_featured: bool,
    pub featured_until: Option<DateTime<Utc>>,

    pub views: u32,
    pub availability_reports: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seller-supplied fields for a new product listing.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub vendor_price: Decimal,
    pub condition: Condition,
    pub location: String,
    pub campus: Option<String>,
    pub whatsapp_number: Option<String>,
    pub images: Vec<String>,
}

impl Product {
    pub fn new(spec: NewProduct) -> Result<Self, CatalogError> {
        if spec.title.trim().is_empty() {
            return Err(CatalogError::Validation("title must not be empty".into()));
        }
        if spec.images.len() < REQUIRED_PRODUCT_IMAGES {
            return Err(CatalogError::Validation(format!(
                "products need at least {} images, got {}",
                REQUIRED_PRODUCT_IMAGES,
                spec.images.len()
            )));
        }
        let images = ImageSlots::new(spec.images)?;
        let quote = pricing::compute_price(spec.vendor_price)?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        Ok(Self {
            id,
            seller_id: spec.seller_id,
            category_id: spec.category_id,
            slug: slug_for(&spec.title, id),
            title: spec.title,
            description: spec.description,
            vendor_price: spec.vendor_price,
            commission_rate: quote.commission_rate,
            price: quote.price,
            condition: spec.condition,
            location: spec.location,
            campus: spec.campus,
            whatsapp_number: spec.whatsapp_number,
            images,
            video_url: None,
            video_duration_seconds: None,
            status: ProductStatus::Pending,
            is_featured: false,
            featured_until: None,
            views: 0,
            availability_reports: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the vendor price and recompute the derived pair, keeping
    /// the three pricing fields consistent.
    pub fn set_vendor_price(&mut self, vendor_price: Decimal) -> Result<(), CatalogError> {
        let quote = pricing::compute_price(vendor_price)?;
        self.vendor_price = vendor_price;
        self.commission_rate = quote.commission_rate;
        self.price = quote.price;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn commission_amount(&self) -> Decimal {
        self.price - self.vendor_price
    }
}

impl Listing for Product {
    fn listing_ref(&self) -> ListingRef {
        ListingRef {
            kind: ListingKind::Product,
            id: self.id,
        }
    }

    fn owner_id(&self) -> Uuid {
        self.seller_id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn listed_price(&self) -> Option<Decimal> {
        Some(self.price)
    }

    fn whatsapp_number(&self) -> Option<&str> {
        self.whatsapp_number.as_deref()
    }

    fn views(&self) -> u32 {
        self.views
    }

    fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }

    fn set_featured(&mut self, until: Option<DateTime<Utc>>) {
        self.is_featured = true;
        self.featured_until = until;
        self.updated_at = Utc::now();
    }

    fn is_currently_featured(&self, now: DateTime<Utc>) -> bool {
        self.is_featured && self.featured_until.map_or(true, |until| until > now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Option<Uuid>,

    pub title: String,
    pub slug: String,
    pub description: String,

    pub price_type: PriceType,
    /// Absent for negotiable services; no pricing recomputation runs then.
    pub vendor_price: Option<Decimal>,
    pub commission_rate: Option<Decimal>,
    pub price: Option<Decimal>,

    pub location: String,
    pub campus: Option<String>,
    pub whatsapp_number: Option<String>,

    pub images: ImageSlots,
    pub video_url: Option<String>,
    pub video_duration_seconds: Option<u32>,

    pub status: ServiceStatus,
    pub is_featured: bool,
    pub featured_until: Option<DateTime<Utc>>,

    pub views: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Provider-supplied fields for a new service listing.
#[derive(Debug, Clone)]
pub struct NewService {
    pub provider_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub price_type: PriceType,
    pub vendor_price: Option<Decimal>,
    pub location: String,
    pub campus: Option<String>,
    pub whatsapp_number: Option<String>,
    pub images: Vec<String>,
}

impl Service {
    pub fn new(spec: NewService) -> Result<Self, CatalogError> {
        if spec.title.trim().is_empty() {
            return Err(CatalogError::Validation("title must not be empty".into()));
        }
        let images = ImageSlots::new(spec.images)?;

        let (commission_rate, price) = match spec.vendor_price {
            Some(vendor_price) => {
                let quote = pricing::compute_price(vendor_price)?;
                (Some(quote.commission_rate), Some(quote.price))
            }
            None => (None, None),
        };

        let id = Uuid::new_v4();
        let now = Utc::now();
        Ok(Self {
            id,
            provider_id: spec.provider_id,
            category_id: spec.category_id,
            slug: slug_for(&spec.title, id),
            title: spec.title,
            description: spec.description,
            price_type: spec.price_type,
            vendor_price: spec.vendor_price,
            commission_rate,
            price,
            location: spec.location,
            campus: spec.campus,
            whatsapp_number: spec.whatsapp_number,
            images,
            video_url: None,
            video_duration_seconds: None,
            status: ServiceStatus::Pending,
            is_featured: false,
            featured_until: None,
            views: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_vendor_price(&mut self, vendor_price: Decimal) -> Result<(), CatalogError> {
        let quote = pricing::compute_price(vendor_price)?;
        self.vendor_price = Some(vendor_price);
        self.commission_rate = Some(quote.commission_rate);
        self.price = Some(quote.price);
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Listing for Service {
    fn listing_ref(&self) -> ListingRef {
        ListingRef {
            kind: ListingKind::Service,
            id: self.id,
        }
    }

    fn owner_id(&self) -> Uuid {
        self.provider_id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn listed_price(&self) -> Option<Decimal> {
        self.price
    }

    fn whatsapp_number(&self) -> Option<&str> {
        self.whatsapp_number.as_deref()
    }

    fn views(&self) -> u32 {
        self.views
    }

    fn record_view(&mut self) {
        self.views = self.views.saturating_add(1);
    }

    fn set_featured(&mut self, until: Option<DateTime<Utc>>) {
        self.is_featured = true;
        self.featured_until = until;
        self.updated_at = Utc::now();
    }

    fn is_currently_featured(&self, now: DateTime<Utc>) -> bool {
        self.is_featured && self.featured_until.map_or(true, |until| until > now)
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unimart_catalog::Listing;
use unimart_promo::PromotionPackage;
use unimart_shared::{ListingRef, Principal};
use uuid::Uuid;

/// Deep link into the external chat application. The engine owns message
/// content only; delivery is the recipient's client.
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("https://wa.me/{}?text={}", digits, urlencoding::encode(message))
}

/// ₦ amount with thousands grouping and no fractional digits, matching the
/// storefront's price formatting.
pub fn format_naira(amount: Decimal) -> String {
    let whole = amount.round_dp(0).trunc().to_string();
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole.as_str()),
    };
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}₦{}", sign, grouped)
}

/// Inquiry sent to a vendor when staff check whether a listing is still
/// available.
pub fn availability_inquiry(listing: &dyn Listing) -> String {
    let price_line = listing
        .listed_price()
        .map(|p| format!("Price: {}\n", format_naira(p)))
        .unwrap_or_default();
    format!(
        "Hello! Someone is interested in your {}:\n\n*{}*\n{}\nIs this still available?",
        listing.listing_ref().kind,
        listing.title(),
        price_line
    )
}

/// Buyer-to-seller interest message carrying the listing URL.
pub fn interest_message(listing: &dyn Listing, listing_url: &str) -> String {
    let price_line = listing
        .listed_price()
        .map(|p| format!("Price: {}\n", format_naira(p)))
        .unwrap_or_default();
    format!(
        "Hello, I'm interested in:\n\n*{}*\n{}\n{}",
        listing.title(),
        price_line,
        listing_url
    )
}

/// Message a seller sends to the admin contact to request featuring.
pub fn promotion_request_message(
    listing: &dyn Listing,
    package: &PromotionPackage,
    requester: &Principal,
) -> String {
    format!(
        "Hello Admin,\n\nI want to promote my {kind}:\n*{title}*\n\n*Package:* {package}\n*Price:* {price}\n*Duration:* {days} days\n\nRequested by: {user}",
        kind = listing.listing_ref().kind,
        title = listing.title(),
        package = package.name,
        price = format_naira(package.price),
        days = package.duration_days,
        user = requester.username,
    )
}

/// A direct message between two users, optionally about a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub listing: Option<ListingRef>,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender_id: Uuid,
        recipient_id: Uuid,
        listing: Option<ListingRef>,
        subject: String,
        body: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            listing,
            subject,
            body,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use unimart_catalog::{Condition, NewProduct, Product};

    fn product() -> Product {
        Product::new(NewProduct {
            seller_id: Uuid::new_v4(),
            category_id: None,
            title: "iPhone 13".to_string(),
            description: "Unlocked".to_string(),
            vendor_price: dec!(8000),
            condition: Condition::Good,
            location: "Hostel B".to_string(),
            campus: None,
            whatsapp_number: Some("+234 801 234 5678".to_string()),
            images: vec!["https://img/1.jpg".into(), "https://img/2.jpg".into()],
        })
        .unwrap()
    }

    #[test]
    fn link_strips_non_digits_and_encodes_the_message() {
        let link = whatsapp_link("+234 (801) 234-5678", "Hello & welcome?");
        assert!(link.starts_with("https://wa.me/2348012345678?text="));
        assert!(!link.contains(' '));
        assert!(!link.contains('&'));
    }

    #[test]
    fn naira_amounts_group_thousands() {
        assert_eq!(format_naira(dec!(16500.00)), "₦16,500");
        assert_eq!(format_naira(dec!(950)), "₦950");
        assert_eq!(format_naira(dec!(1234567)), "₦1,234,567");
    }

    #[test]
    fn inquiry_carries_title_and_listed_price() {
        let product = product();
        let message = availability_inquiry(&product);
        assert!(message.contains("*iPhone 13*"));
        assert!(message.contains("₦9,600"));
    }

    #[test]
    fn promotion_request_names_the_package() {
        let product = product();
        let package = PromotionPackage::new(
            "Weekly boost".into(),
            7,
            dec!(1000),
            "7 days featured".into(),
        );
        let requester = Principal::user(product.seller_id, "chidi");
        let message = promotion_request_message(&product, &package, &requester);
        assert!(message.contains("*Package:* Weekly boost"));
        assert!(message.contains("*Duration:* 7 days"));
        assert!(message.contains("chidi"));
    }

    #[test]
    fn messages_flip_the_read_flag() {
        let mut message = Message::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            "Still available?".into(),
            "Hi, is this sold?".into(),
        );
        assert!(!message.is_read);
        message.mark_read();
        assert!(message.is_read);
    }
}

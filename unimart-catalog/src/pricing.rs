use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// Vendor prices at or below this amount take the high commission tier.
pub const LOW_TIER_THRESHOLD: Decimal = dec!(9999);

/// Commission applied to listings priced within the low tier.
pub const LOW_TIER_RATE: Decimal = dec!(20.00);

/// Commission applied above the threshold.
pub const HIGH_TIER_RATE: Decimal = dec!(10.00);

/// Derived pricing for a listing: the commission percentage selected by the
/// tier rule and the final listed price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub commission_rate: Decimal,
    pub price: Decimal,
}

impl Quote {
    pub fn commission_amount(&self, vendor_price: Decimal) -> Decimal {
        self.price - vendor_price
    }
}

/// Select the commission rate for a vendor price. The threshold is
/// inclusive on the low-tier side: exactly 9999 pays 20%.
pub fn commission_rate_for(vendor_price: Decimal) -> Decimal {
    if vendor_price <= LOW_TIER_THRESHOLD {
        LOW_TIER_RATE
    } else {
        HIGH_TIER_RATE
    }
}

/// Compute the derived pricing pair for a vendor price.
///
/// Pure and idempotent: the same input always yields the same quote.
/// Currency values round to 2 fractional digits.
pub fn compute_price(vendor_price: Decimal) -> Result<Quote, CatalogError> {
    if vendor_price < Decimal::ZERO {
        return Err(CatalogError::Validation(format!(
            "vendor price must be non-negative, got {}",
            vendor_price
        )));
    }

    let rate = commission_rate_for(vendor_price);
    let commission = (vendor_price * rate / dec!(100)).round_dp(2);
    let price = (vendor_price + commission).round_dp(2);

    Ok(Quote {
        commission_rate: rate,
        price,
    })
}

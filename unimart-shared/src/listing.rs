use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The two listing variants the marketplace trades in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingKind {
    Product,
    Service,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Product => "product",
            ListingKind::Service => "service",
        }
    }
}

impl std::str::FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(ListingKind::Product),
            "service" => Ok(ListingKind::Service),
            other => Err(format!("unknown listing kind: {}", other)),
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged reference to exactly one Product or Service.
///
/// Cross-entity records (reviews, promotions, messages) carry this instead
/// of a pair of nullable foreign keys, so "neither" and "both" are
/// unrepresentable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ListingRef {
    pub kind: ListingKind,
    pub id: Uuid,
}

impl ListingRef {
    pub fn product(id: Uuid) -> Self {
        Self {
            kind: ListingKind::Product,
            id,
        }
    }

    pub fn service(id: Uuid) -> Self {
        Self {
            kind: ListingKind::Service,
            id,
        }
    }
}

impl fmt::Display for ListingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        let kind: ListingKind = "service".parse().unwrap();
        assert_eq!(kind, ListingKind::Service);
        assert_eq!(kind.as_str(), "service");
        assert!("gadget".parse::<ListingKind>().is_err());
    }

    #[test]
    fn refs_are_distinct_across_kinds() {
        let id = Uuid::new_v4();
        assert_ne!(ListingRef::product(id), ListingRef::service(id));
    }
}

//! Trade entity, lifecycle status and typed filters.

use chrono::{DateTime, NaiveDate, Utc};

/// Trade direction. The sign of derived position quantities comes from
/// here, never from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Purchase,
    Sale,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Purchase => "Purchase",
            Operation::Sale => "Sale",
        }
    }

    pub fn parse(value: &str) -> Option<Operation> {
        match value.trim().to_lowercase().as_str() {
            "purchase" | "buy" => Some(Operation::Purchase),
            "sale" | "sell" => Some(Operation::Sale),
            _ => None,
        }
    }

    /// +1 for purchase direction, -1 for sale direction.
    pub fn direction(&self) -> f64 {
        match self {
            Operation::Purchase => 1.0,
            Operation::Sale => -1.0,
        }
    }
}

/// One-way lifecycle: Active -> Inactive. There is no reactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Active,
    Inactive,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Active => "active",
            TradeStatus::Inactive => "inactive",
        }
    }

    pub fn parse(value: &str) -> Option<TradeStatus> {
        match value.trim().to_lowercase().as_str() {
            "active" => Some(TradeStatus::Active),
            "inactive" => Some(TradeStatus::Inactive),
            _ => None,
        }
    }
}

/// A trade as stored: id and timestamps are store-assigned at insertion.
#[derive(Debug, Clone)]
pub struct Trade {
    pub id: i64,
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub operation: Operation,
    pub tons: f64,
    pub level: f64,
    pub notion: f64,
    pub status: TradeStatus,
    pub date: NaiveDate,
    pub reg: DateTime<Utc>,
}

impl Trade {
    pub fn is_active(&self) -> bool {
        self.status == TradeStatus::Active
    }
}

/// Caller-supplied fields of a new trade, before validation and stamping.
#[derive(Debug, Clone)]
pub struct TradeDraft {
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub operation: Operation,
    pub tons: f64,
    pub level: f64,
    pub notion: f64,
}

/// A fully stamped trade document, ready for insertion. The store assigns
/// the id.
#[derive(Debug, Clone)]
pub struct TradeDocument {
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub operation: Operation,
    pub tons: f64,
    pub level: f64,
    pub notion: f64,
    pub status: TradeStatus,
    pub date: NaiveDate,
    pub reg: DateTime<Utc>,
}

/// Partial update: only `Some` fields are merged. `reg`/`date` are never
/// touched, and status changes go through the delete path instead.
#[derive(Debug, Clone, Default)]
pub struct TradePatch {
    pub product: Option<String>,
    pub category: Option<String>,
    pub shipment: Option<String>,
    pub year: Option<i32>,
    pub operation: Option<Operation>,
    pub tons: Option<f64>,
    pub level: Option<f64>,
    pub notion: Option<f64>,
}

impl TradePatch {
    pub fn is_empty(&self) -> bool {
        self.product.is_none()
            && self.category.is_none()
            && self.shipment.is_none()
            && self.year.is_none()
            && self.operation.is_none()
            && self.tons.is_none()
            && self.level.is_none()
            && self.notion.is_none()
    }

    /// Trim string fields before merging.
    pub fn trimmed(&self) -> TradePatch {
        let trim = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string());
        TradePatch {
            product: trim(&self.product),
            category: trim(&self.category),
            shipment: trim(&self.shipment),
            ..self.clone()
        }
    }
}

/// Equality filters for trade retrieval, plus an inclusive range on the
/// insertion-day field.
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub product: Option<String>,
    pub category: Option<String>,
    pub shipment: Option<String>,
    pub year: Option<i32>,
    pub operation: Option<Operation>,
    pub status: Option<TradeStatus>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl TradeFilter {
    /// Empty or whitespace-only strings mean "no filter", not a literal
    /// match against the empty string.
    pub fn normalized(&self) -> TradeFilter {
        let clean = |v: &Option<String>| {
            v.as_ref()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        TradeFilter {
            product: clean(&self.product),
            category: clean(&self.category),
            shipment: clean(&self.shipment),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_parse_accepts_aliases() {
        assert_eq!(Operation::parse("Purchase"), Some(Operation::Purchase));
        assert_eq!(Operation::parse("  buy "), Some(Operation::Purchase));
        assert_eq!(Operation::parse("SALE"), Some(Operation::Sale));
        assert_eq!(Operation::parse("sell"), Some(Operation::Sale));
        assert_eq!(Operation::parse("hold"), None);
    }

    #[test]
    fn operation_direction_signs() {
        assert_eq!(Operation::Purchase.direction(), 1.0);
        assert_eq!(Operation::Sale.direction(), -1.0);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [TradeStatus::Active, TradeStatus::Inactive] {
            assert_eq!(TradeStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TradeStatus::parse("deleted"), None);
    }

    #[test]
    fn patch_is_empty_only_without_fields() {
        assert!(TradePatch::default().is_empty());
        let patch = TradePatch {
            tons: Some(5.0),
            ..TradePatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_trimmed_trims_only_strings() {
        let patch = TradePatch {
            product: Some("  SoyBean ".into()),
            shipment: Some("Mar".into()),
            year: Some(2024),
            ..TradePatch::default()
        };
        let trimmed = patch.trimmed();
        assert_eq!(trimmed.product.as_deref(), Some("SoyBean"));
        assert_eq!(trimmed.shipment.as_deref(), Some("Mar"));
        assert_eq!(trimmed.year, Some(2024));
    }

    #[test]
    fn filter_normalized_drops_empty_strings() {
        let filter = TradeFilter {
            product: Some("".into()),
            category: Some("   ".into()),
            shipment: Some(" Jan ".into()),
            year: Some(2024),
            ..TradeFilter::default()
        };
        let normalized = filter.normalized();
        assert_eq!(normalized.product, None);
        assert_eq!(normalized.category, None);
        assert_eq!(normalized.shipment.as_deref(), Some("Jan"));
        assert_eq!(normalized.year, Some(2024));
    }
}

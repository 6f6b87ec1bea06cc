//! Position observations.
//!
//! Positions are append-only: each record is one observation of directional
//! exposure, not a running balance. Summarization is the consumer's job.

use chrono::{DateTime, NaiveDate, Utc};

use super::trade::Operation;

/// Quantity is signed: positive for purchase direction, negative for sale.
#[derive(Debug, Clone)]
pub struct PositionRecord {
    pub id: i64,
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub position: f64,
    pub date: NaiveDate,
    pub reg: DateTime<Utc>,
}

impl PositionRecord {
    pub fn is_long(&self) -> bool {
        self.position > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.position < 0.0
    }
}

/// Caller-supplied fields for a new position. Tonnage is unsigned here;
/// the record service derives the sign from `operation`.
#[derive(Debug, Clone)]
pub struct PositionDraft {
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub operation: Operation,
    pub tons: f64,
}

/// A stamped position document ready for insertion; quantity already signed.
#[derive(Debug, Clone)]
pub struct PositionDocument {
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub position: f64,
    pub date: NaiveDate,
    pub reg: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PositionFilter {
    pub product: Option<String>,
    pub category: Option<String>,
    pub shipment: Option<String>,
    pub year: Option<i32>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl PositionFilter {
    pub fn normalized(&self) -> PositionFilter {
        let clean = |v: &Option<String>| {
            v.as_ref()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        PositionFilter {
            product: clean(&self.product),
            category: clean(&self.category),
            shipment: clean(&self.shipment),
            ..self.clone()
        }
    }
}

//! Mark-to-market records.
//!
//! An MTM record references the trade it values and carries a snapshot of
//! that trade's descriptive fields, captured when the record is written.
//! Later trade edits do not propagate into existing records.

use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone)]
pub struct MtmRecord {
    pub id: i64,
    pub trade_id: i64,
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub mtm: f64,
    pub pnl: f64,
    pub date: NaiveDate,
    pub reg: DateTime<Utc>,
}

/// A stamped MTM document ready for insertion; the store assigns the id.
#[derive(Debug, Clone)]
pub struct MtmDocument {
    pub trade_id: i64,
    pub product: String,
    pub category: String,
    pub shipment: String,
    pub year: i32,
    pub mtm: f64,
    pub pnl: f64,
    pub date: NaiveDate,
    pub reg: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MtmFilter {
    pub trade_id: Option<i64>,
    pub product: Option<String>,
    pub category: Option<String>,
    pub shipment: Option<String>,
    pub year: Option<i32>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl MtmFilter {
    pub fn normalized(&self) -> MtmFilter {
        let clean = |v: &Option<String>| {
            v.as_ref()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        MtmFilter {
            product: clean(&self.product),
            category: clean(&self.category),
            shipment: clean(&self.shipment),
            ..self.clone()
        }
    }
}

#![allow(dead_code)]

use pnldesk::adapters::sqlite_store::SqliteStore;
use pnldesk::domain::trade::{Operation, TradeDraft};

/// Fresh in-memory store with the schema in place.
pub fn memory_store() -> SqliteStore {
    let store = SqliteStore::in_memory().expect("in-memory store");
    store.initialize_schema().expect("schema");
    store
}

pub fn draft(product: &str, year: i32, tons: f64, notion: f64) -> TradeDraft {
    TradeDraft {
        product: product.to_string(),
        category: "FOB Vessel".to_string(),
        shipment: "Jan".to_string(),
        year,
        operation: Operation::Purchase,
        tons,
        level: 1.0,
        notion,
    }
}

pub fn soybean_draft() -> TradeDraft {
    draft("SoyBean", 2024, 100.0, 1000.0)
}

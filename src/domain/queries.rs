//! Predicate-based retrieval services.
//!
//! Filters are normalized here so the store never sees an empty-string
//! predicate: an empty selection in a caller's form means "no filter".

use super::error::PnldeskError;
use super::mtm::{MtmFilter, MtmRecord};
use super::position::{PositionFilter, PositionRecord};
use super::trade::{Trade, TradeFilter};
use crate::ports::store_port::{Collection, StorePort};

/// All trades matching the filter, most recently registered first.
pub fn get_trades(store: &dyn StorePort, filter: &TradeFilter) -> Result<Vec<Trade>, PnldeskError> {
    store.query_trades(&filter.normalized())
}

/// MTM records matching the filter, most recently registered first.
pub fn get_mtm(store: &dyn StorePort, filter: &MtmFilter) -> Result<Vec<MtmRecord>, PnldeskError> {
    store.query_mtm(&filter.normalized())
}

/// Position observations matching the filter, most recently registered first.
pub fn get_positions(
    store: &dyn StorePort,
    filter: &PositionFilter,
) -> Result<Vec<PositionRecord>, PnldeskError> {
    store.query_positions(&filter.normalized())
}

/// Every MTM record referencing one trade, in store-native order. Returns
/// records even when the trade has since been marked inactive.
pub fn get_mtm_by_trade(
    store: &dyn StorePort,
    trade_id: i64,
) -> Result<Vec<MtmRecord>, PnldeskError> {
    store.mtm_by_trade(trade_id)
}

/// Distinct non-empty values of one field, sorted ascending. Scans the
/// whole collection on every call; fine at this scale, a cache or index
/// would be needed past it.
pub fn get_unique_values(
    store: &dyn StorePort,
    collection: Collection,
    field: &str,
) -> Result<Vec<String>, PnldeskError> {
    store.unique_values(collection, field)
}

//! Document store access port.
//!
//! Models the external store surface: typed insert/get/update/query per
//! collection. Identifiers are store-assigned and immutable. Implementations
//! must return `trades`/`mtm`/`positions` query results ordered by `reg`
//! descending; [`StorePort::mtm_by_trade`] keeps store-native order.

use crate::domain::error::PnldeskError;
use crate::domain::mtm::{MtmDocument, MtmFilter, MtmRecord};
use crate::domain::position::{PositionDocument, PositionFilter, PositionRecord};
use crate::domain::trade::{Trade, TradeDocument, TradeFilter, TradePatch, TradeStatus};

/// The three collections the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Trades,
    Mtm,
    Positions,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Trades => "trades",
            Collection::Mtm => "mtm",
            Collection::Positions => "positions",
        }
    }

    pub fn parse(value: &str) -> Option<Collection> {
        match value.trim().to_lowercase().as_str() {
            "trades" => Some(Collection::Trades),
            "mtm" => Some(Collection::Mtm),
            "positions" => Some(Collection::Positions),
            _ => None,
        }
    }
}

pub trait StorePort {
    fn insert_trade(&self, doc: &TradeDocument) -> Result<i64, PnldeskError>;

    fn get_trade(&self, id: i64) -> Result<Option<Trade>, PnldeskError>;

    /// Merge the patch's `Some` fields into an existing trade. The caller
    /// is responsible for existence checks; updating an absent id is a
    /// no-op at this layer.
    fn update_trade(&self, id: i64, patch: &TradePatch) -> Result<(), PnldeskError>;

    fn set_trade_status(&self, id: i64, status: TradeStatus) -> Result<(), PnldeskError>;

    fn query_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, PnldeskError>;

    fn insert_mtm(&self, doc: &MtmDocument) -> Result<i64, PnldeskError>;

    fn query_mtm(&self, filter: &MtmFilter) -> Result<Vec<MtmRecord>, PnldeskError>;

    fn mtm_by_trade(&self, trade_id: i64) -> Result<Vec<MtmRecord>, PnldeskError>;

    fn insert_position(&self, doc: &PositionDocument) -> Result<i64, PnldeskError>;

    fn query_positions(&self, filter: &PositionFilter)
        -> Result<Vec<PositionRecord>, PnldeskError>;

    /// Distinct non-empty values of one whitelisted field, sorted ascending.
    /// Unknown fields are an [`PnldeskError::InvalidField`] error.
    fn unique_values(&self, collection: Collection, field: &str)
        -> Result<Vec<String>, PnldeskError>;

    /// Document count of a collection. Used by callers that need to verify
    /// that a failed operation wrote nothing.
    fn count(&self, collection: Collection) -> Result<usize, PnldeskError>;
}

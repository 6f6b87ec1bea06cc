//! Single-entity mutation services.
//!
//! Each function takes the store client explicitly; there is no ambient
//! store handle. A failed precondition (validation, missing referent)
//! aborts before any write reaches the store.

use chrono::Utc;

use super::error::PnldeskError;
use super::mtm::MtmDocument;
use super::position::{PositionDocument, PositionDraft};
use super::trade::{TradeDocument, TradeDraft, TradePatch, TradeStatus};
use super::validation;
use crate::ports::store_port::StorePort;

/// Validate and insert a new trade. Starts `active`; the store assigns the
/// id and the record is stamped with the current UTC instant and day.
pub fn add_trade(store: &dyn StorePort, draft: &TradeDraft) -> Result<i64, PnldeskError> {
    let messages = validation::validate_trade(draft);
    if !messages.is_empty() {
        return Err(PnldeskError::Validation { messages });
    }

    let now = Utc::now();
    let doc = TradeDocument {
        product: draft.product.trim().to_string(),
        category: draft.category.trim().to_string(),
        shipment: draft.shipment.trim().to_string(),
        year: draft.year,
        operation: draft.operation,
        tons: draft.tons,
        level: draft.level,
        notion: draft.notion,
        status: TradeStatus::Active,
        date: now.date_naive(),
        reg: now,
    };
    store.insert_trade(&doc)
}

/// Record a mark-to-market valuation against an existing trade.
///
/// The trade's descriptive fields are copied into the record at this
/// moment; later edits to the trade do not propagate. The trade's status is
/// deliberately not checked, so valuations may continue against trades
/// already marked inactive.
pub fn add_mtm(
    store: &dyn StorePort,
    trade_id: i64,
    mtm: f64,
    pnl: f64,
) -> Result<i64, PnldeskError> {
    let trade = store
        .get_trade(trade_id)?
        .ok_or(PnldeskError::TradeNotFound { id: trade_id })?;

    let now = Utc::now();
    let doc = MtmDocument {
        trade_id: trade.id,
        product: trade.product,
        category: trade.category,
        shipment: trade.shipment,
        year: trade.year,
        mtm,
        pnl,
        date: now.date_naive(),
        reg: now,
    };
    store.insert_mtm(&doc)
}

/// Validate and insert a position observation. The draft carries unsigned
/// tonnage; the sign comes from the operation here and nowhere else.
pub fn add_position(store: &dyn StorePort, draft: &PositionDraft) -> Result<i64, PnldeskError> {
    let messages = validation::validate_position(draft);
    if !messages.is_empty() {
        return Err(PnldeskError::Validation { messages });
    }

    let now = Utc::now();
    let doc = PositionDocument {
        product: draft.product.trim().to_string(),
        category: draft.category.trim().to_string(),
        shipment: draft.shipment.trim().to_string(),
        year: draft.year,
        position: draft.operation.direction() * draft.tons,
        date: now.date_naive(),
        reg: now,
    };
    store.insert_position(&doc)
}

/// Merge the provided fields into an existing trade. String fields are
/// trimmed; the record's timestamps are left as inserted.
pub fn update_trade(
    store: &dyn StorePort,
    trade_id: i64,
    patch: &TradePatch,
) -> Result<(), PnldeskError> {
    if store.get_trade(trade_id)?.is_none() {
        return Err(PnldeskError::TradeNotFound { id: trade_id });
    }

    let patch = patch.trimmed();
    if patch.is_empty() {
        return Ok(());
    }
    store.update_trade(trade_id, &patch)
}

/// Flip the trade to inactive. The document is never removed, so existing
/// MTM backreferences stay resolvable. Repeating the call is harmless.
pub fn delete_trade(store: &dyn StorePort, trade_id: i64) -> Result<(), PnldeskError> {
    if store.get_trade(trade_id)?.is_none() {
        return Err(PnldeskError::TradeNotFound { id: trade_id });
    }
    store.set_trade_status(trade_id, TradeStatus::Inactive)
}

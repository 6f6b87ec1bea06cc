//! CSV export adapter.
//!
//! Writes fetched records to disk with the store's wire field names as the
//! header row, so exports line up with what other store consumers expect.

use crate::domain::error::PnldeskError;
use crate::domain::mtm::MtmRecord;
use crate::domain::position::PositionRecord;
use crate::domain::trade::Trade;
use std::path::Path;

fn csv_io(e: csv::Error) -> PnldeskError {
    PnldeskError::Io(std::io::Error::other(e))
}

pub fn export_trades(path: &Path, trades: &[Trade]) -> Result<(), PnldeskError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_io)?;
    writer
        .write_record([
            "id", "prod", "cat", "ship", "year", "op", "ton", "lvl", "notion", "status", "date",
            "reg",
        ])
        .map_err(csv_io)?;

    for trade in trades {
        writer
            .write_record([
                trade.id.to_string(),
                trade.product.clone(),
                trade.category.clone(),
                trade.shipment.clone(),
                trade.year.to_string(),
                trade.operation.as_str().to_string(),
                trade.tons.to_string(),
                trade.level.to_string(),
                trade.notion.to_string(),
                trade.status.as_str().to_string(),
                trade.date.format("%Y-%m-%d").to_string(),
                trade.reg.to_rfc3339(),
            ])
            .map_err(csv_io)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_mtm(path: &Path, records: &[MtmRecord]) -> Result<(), PnldeskError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_io)?;
    writer
        .write_record([
            "id", "trade_id", "prod", "cat", "ship", "year", "mtm", "pnl", "date", "reg",
        ])
        .map_err(csv_io)?;

    for record in records {
        writer
            .write_record([
                record.id.to_string(),
                record.trade_id.to_string(),
                record.product.clone(),
                record.category.clone(),
                record.shipment.clone(),
                record.year.to_string(),
                record.mtm.to_string(),
                record.pnl.to_string(),
                record.date.format("%Y-%m-%d").to_string(),
                record.reg.to_rfc3339(),
            ])
            .map_err(csv_io)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_positions(path: &Path, positions: &[PositionRecord]) -> Result<(), PnldeskError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_io)?;
    writer
        .write_record(["id", "prod", "cat", "ship", "year", "pos", "date", "reg"])
        .map_err(csv_io)?;

    for position in positions {
        writer
            .write_record([
                position.id.to_string(),
                position.product.clone(),
                position.category.clone(),
                position.shipment.clone(),
                position.year.to_string(),
                position.position.to_string(),
                position.date.format("%Y-%m-%d").to_string(),
                position.reg.to_rfc3339(),
            ])
            .map_err(csv_io)?;
    }

    writer.flush()?;
    Ok(())
}

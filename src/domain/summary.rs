//! Aggregation engine: per-(product, year) rollups.
//!
//! Both summaries are pure functions of the fetched record sequence, safe
//! to recompute on every call. Group output order is the order in which
//! each (product, year) key first appears in the input.

use std::collections::HashMap;

use super::error::PnldeskError;
use super::mtm::{MtmFilter, MtmRecord};
use super::queries;
use super::trade::{Trade, TradeFilter};
use crate::ports::store_port::StorePort;

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSummary {
    pub product: String,
    pub year: i32,
    pub total_tons: f64,
    pub total_notion: f64,
    pub trade_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PnlSummary {
    pub product: String,
    pub year: i32,
    pub total_mtm: f64,
    pub total_pnl: f64,
    pub record_count: usize,
}

/// Roll active trades up by (product, year). Inactive trades contribute
/// nothing, not even to the count.
pub fn position_summary(trades: &[Trade]) -> Vec<PositionSummary> {
    let mut index: HashMap<(String, i32), usize> = HashMap::new();
    let mut groups: Vec<PositionSummary> = Vec::new();

    for trade in trades {
        if !trade.is_active() {
            continue;
        }
        let slot = *index
            .entry((trade.product.clone(), trade.year))
            .or_insert_with(|| {
                groups.push(PositionSummary {
                    product: trade.product.clone(),
                    year: trade.year,
                    total_tons: 0.0,
                    total_notion: 0.0,
                    trade_count: 0,
                });
                groups.len() - 1
            });
        let group = &mut groups[slot];
        group.total_tons += trade.tons;
        group.total_notion += trade.notion;
        group.trade_count += 1;
    }

    groups
}

/// Roll MTM records up by (product, year).
pub fn pnl_summary(records: &[MtmRecord]) -> Vec<PnlSummary> {
    let mut index: HashMap<(String, i32), usize> = HashMap::new();
    let mut groups: Vec<PnlSummary> = Vec::new();

    for record in records {
        let slot = *index
            .entry((record.product.clone(), record.year))
            .or_insert_with(|| {
                groups.push(PnlSummary {
                    product: record.product.clone(),
                    year: record.year,
                    total_mtm: 0.0,
                    total_pnl: 0.0,
                    record_count: 0,
                });
                groups.len() - 1
            });
        let group = &mut groups[slot];
        group.total_mtm += record.mtm;
        group.total_pnl += record.pnl;
        group.record_count += 1;
    }

    groups
}

/// Fetch every trade and summarize the active ones.
pub fn get_position_summary(store: &dyn StorePort) -> Result<Vec<PositionSummary>, PnldeskError> {
    let trades = queries::get_trades(store, &TradeFilter::default())?;
    Ok(position_summary(&trades))
}

/// Fetch MTM records matching the filter and summarize them.
pub fn get_pnl_summary(
    store: &dyn StorePort,
    filter: &MtmFilter,
) -> Result<Vec<PnlSummary>, PnldeskError> {
    let records = queries::get_mtm(store, filter)?;
    Ok(pnl_summary(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::{Operation, TradeStatus};
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    fn make_trade(product: &str, year: i32, tons: f64, notion: f64, status: TradeStatus) -> Trade {
        Trade {
            id: 0,
            product: product.into(),
            category: "FOB Vessel".into(),
            shipment: "Jan".into(),
            year,
            operation: Operation::Purchase,
            tons,
            level: 1.0,
            notion,
            status,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            reg: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn make_mtm(product: &str, year: i32, mtm: f64, pnl: f64) -> MtmRecord {
        MtmRecord {
            id: 0,
            trade_id: 1,
            product: product.into(),
            category: "FOB Vessel".into(),
            shipment: "Jan".into(),
            year,
            mtm,
            pnl,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            reg: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn position_summary_excludes_inactive_trades() {
        let trades = vec![
            make_trade("SoyBean", 2024, 100.0, 1000.0, TradeStatus::Active),
            make_trade("SoyBean", 2024, 50.0, 500.0, TradeStatus::Active),
            make_trade("SoyBean", 2024, 999.0, 999.0, TradeStatus::Inactive),
        ];
        let groups = position_summary(&trades);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].product, "SoyBean");
        assert_eq!(groups[0].year, 2024);
        assert_relative_eq!(groups[0].total_tons, 150.0);
        assert_relative_eq!(groups[0].total_notion, 1500.0);
        assert_eq!(groups[0].trade_count, 2);
    }

    #[test]
    fn position_summary_groups_in_first_occurrence_order() {
        let trades = vec![
            make_trade("YelCorn", 2025, 10.0, 100.0, TradeStatus::Active),
            make_trade("SoyBean", 2024, 20.0, 200.0, TradeStatus::Active),
            make_trade("YelCorn", 2025, 30.0, 300.0, TradeStatus::Active),
            make_trade("YelCorn", 2024, 40.0, 400.0, TradeStatus::Active),
        ];
        let groups = position_summary(&trades);
        let keys: Vec<(&str, i32)> = groups
            .iter()
            .map(|g| (g.product.as_str(), g.year))
            .collect();
        assert_eq!(
            keys,
            vec![("YelCorn", 2025), ("SoyBean", 2024), ("YelCorn", 2024)]
        );
        assert_relative_eq!(groups[0].total_tons, 40.0);
    }

    #[test]
    fn position_summary_of_only_inactive_is_empty() {
        let trades = vec![make_trade("SoyMeal", 2024, 5.0, 50.0, TradeStatus::Inactive)];
        assert!(position_summary(&trades).is_empty());
    }

    #[test]
    fn pnl_summary_sums_signed_values() {
        let records = vec![
            make_mtm("X", 2023, 10.0, 2.0),
            make_mtm("X", 2023, -5.0, -1.0),
        ];
        let groups = pnl_summary(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].product, "X");
        assert_eq!(groups[0].year, 2023);
        assert_relative_eq!(groups[0].total_mtm, 5.0);
        assert_relative_eq!(groups[0].total_pnl, 1.0);
        assert_eq!(groups[0].record_count, 2);
    }

    #[test]
    fn pnl_summary_separates_years_within_product() {
        let records = vec![
            make_mtm("SoyBean", 2023, 1.0, 1.0),
            make_mtm("SoyBean", 2024, 2.0, 2.0),
        ];
        let groups = pnl_summary(&records);
        assert_eq!(groups.len(), 2);
    }

    proptest! {
        /// Grouping must neither drop nor invent tonnage: the sum over all
        /// groups equals the sum over all active input trades.
        #[test]
        fn grouping_preserves_active_totals(
            inputs in proptest::collection::vec(
                (0usize..3, 2020i32..2026, 0.1f64..1000.0, 0.1f64..10000.0, proptest::bool::ANY),
                0..40,
            )
        ) {
            let products = ["SoyBean", "SoyMeal", "YelCorn"];
            let trades: Vec<Trade> = inputs
                .iter()
                .map(|&(p, year, tons, notion, active)| {
                    let status = if active { TradeStatus::Active } else { TradeStatus::Inactive };
                    make_trade(products[p], year, tons, notion, status)
                })
                .collect();

            let groups = position_summary(&trades);

            let expected_tons: f64 = trades.iter().filter(|t| t.is_active()).map(|t| t.tons).sum();
            let grouped_tons: f64 = groups.iter().map(|g| g.total_tons).sum();
            prop_assert!((expected_tons - grouped_tons).abs() < 1e-6);

            let expected_count: usize = trades.iter().filter(|t| t.is_active()).count();
            let grouped_count: usize = groups.iter().map(|g| g.trade_count).sum();
            prop_assert_eq!(expected_count, grouped_count);
        }
    }
}

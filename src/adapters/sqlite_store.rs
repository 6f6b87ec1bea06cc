//! SQLite document store adapter.
//!
//! Backs [`StorePort`] with a pooled SQLite database. Column names are the
//! wire contract (`prod`, `cat`, `ship`, `year`, ...); `reg` holds an
//! RFC 3339 UTC timestamp and `date` the `YYYY-MM-DD` insertion day.

use crate::domain::error::PnldeskError;
use crate::domain::mtm::{MtmDocument, MtmFilter, MtmRecord};
use crate::domain::position::{PositionDocument, PositionFilter, PositionRecord};
use crate::domain::trade::{
    Operation, Trade, TradeDocument, TradeFilter, TradePatch, TradeStatus,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::{Collection, StorePort};
use chrono::{DateTime, NaiveDate, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, ToSql};

const TRADE_COLUMNS: &str = "id, prod, cat, ship, year, op, ton, lvl, notion, status, date, reg";
const MTM_COLUMNS: &str = "id, trade_id, prod, cat, ship, year, mtm, pnl, date, reg";
const POSITION_COLUMNS: &str = "id, prod, cat, ship, year, pos, date, reg";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, PnldeskError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| PnldeskError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| PnldeskError::Store {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, PnldeskError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| PnldeskError::Store {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Create the three collections. Safe to call repeatedly and at every
    /// process start.
    pub fn initialize_schema(&self) -> Result<(), PnldeskError> {
        let conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| PnldeskError::Store {
                reason: e.to_string(),
            })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prod TEXT NOT NULL,
                cat TEXT NOT NULL,
                ship TEXT NOT NULL,
                year INTEGER NOT NULL,
                op TEXT NOT NULL,
                ton REAL NOT NULL,
                lvl REAL NOT NULL,
                notion REAL NOT NULL,
                status TEXT NOT NULL,
                date TEXT NOT NULL,
                reg TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_reg ON trades(reg);
            CREATE TABLE IF NOT EXISTS mtm (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trade_id INTEGER NOT NULL,
                prod TEXT NOT NULL,
                cat TEXT NOT NULL,
                ship TEXT NOT NULL,
                year INTEGER NOT NULL,
                mtm REAL NOT NULL,
                pnl REAL NOT NULL,
                date TEXT NOT NULL,
                reg TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_mtm_trade_id ON mtm(trade_id);
            CREATE TABLE IF NOT EXISTS positions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                prod TEXT NOT NULL,
                cat TEXT NOT NULL,
                ship TEXT NOT NULL,
                year INTEGER NOT NULL,
                pos REAL NOT NULL,
                date TEXT NOT NULL,
                reg TEXT NOT NULL
            );",
        )
        .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, PnldeskError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| PnldeskError::Store {
                reason: e.to_string(),
            })
    }

    fn allowed_field(collection: Collection, field: &str) -> bool {
        match collection {
            Collection::Trades => matches!(
                field,
                "prod" | "cat" | "ship" | "year" | "op" | "status" | "date"
            ),
            Collection::Mtm => {
                matches!(field, "trade_id" | "prod" | "cat" | "ship" | "year" | "date")
            }
            Collection::Positions => matches!(field, "prod" | "cat" | "ship" | "year" | "date"),
        }
    }
}

fn parse_date(value: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(value.len(), Type::Text, Box::new(e))
    })
}

fn parse_reg(value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(value.len(), Type::Text, Box::new(e))
        })
}

fn invalid_text(value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        value.len(),
        Type::Text,
        format!("unrecognized value: {value}").into(),
    )
}

fn map_trade_row(row: &Row<'_>) -> rusqlite::Result<Trade> {
    let op_text: String = row.get(5)?;
    let status_text: String = row.get(9)?;
    Ok(Trade {
        id: row.get(0)?,
        product: row.get(1)?,
        category: row.get(2)?,
        shipment: row.get(3)?,
        year: row.get(4)?,
        operation: Operation::parse(&op_text).ok_or_else(|| invalid_text(&op_text))?,
        tons: row.get(6)?,
        level: row.get(7)?,
        notion: row.get(8)?,
        status: TradeStatus::parse(&status_text).ok_or_else(|| invalid_text(&status_text))?,
        date: parse_date(row.get(10)?)?,
        reg: parse_reg(row.get(11)?)?,
    })
}

fn map_mtm_row(row: &Row<'_>) -> rusqlite::Result<MtmRecord> {
    Ok(MtmRecord {
        id: row.get(0)?,
        trade_id: row.get(1)?,
        product: row.get(2)?,
        category: row.get(3)?,
        shipment: row.get(4)?,
        year: row.get(5)?,
        mtm: row.get(6)?,
        pnl: row.get(7)?,
        date: parse_date(row.get(8)?)?,
        reg: parse_reg(row.get(9)?)?,
    })
}

fn map_position_row(row: &Row<'_>) -> rusqlite::Result<PositionRecord> {
    Ok(PositionRecord {
        id: row.get(0)?,
        product: row.get(1)?,
        category: row.get(2)?,
        shipment: row.get(3)?,
        year: row.get(4)?,
        position: row.get(5)?,
        date: parse_date(row.get(6)?)?,
        reg: parse_reg(row.get(7)?)?,
    })
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, PnldeskError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
            reason: e.to_string(),
        })?);
    }
    Ok(out)
}

impl StorePort for SqliteStore {
    fn insert_trade(&self, doc: &TradeDocument) -> Result<i64, PnldeskError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO trades (prod, cat, ship, year, op, ton, lvl, notion, status, date, reg)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                doc.product,
                doc.category,
                doc.shipment,
                doc.year,
                doc.operation.as_str(),
                doc.tons,
                doc.level,
                doc.notion,
                doc.status.as_str(),
                doc.date.format("%Y-%m-%d").to_string(),
                doc.reg.to_rfc3339(),
            ],
        )
        .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
            reason: e.to_string(),
        })?;

        Ok(conn.last_insert_rowid())
    }

    fn get_trade(&self, id: i64) -> Result<Option<Trade>, PnldeskError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?1"),
            params![id],
            map_trade_row,
        )
        .optional()
        .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
            reason: e.to_string(),
        })
    }

    fn update_trade(&self, id: i64, patch: &TradePatch) -> Result<(), PnldeskError> {
        let op_text = patch.operation.map(|o| o.as_str().to_string());

        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(ref v) = patch.product {
            assignments.push("prod = ?");
            values.push(v);
        }
        if let Some(ref v) = patch.category {
            assignments.push("cat = ?");
            values.push(v);
        }
        if let Some(ref v) = patch.shipment {
            assignments.push("ship = ?");
            values.push(v);
        }
        if let Some(ref v) = patch.year {
            assignments.push("year = ?");
            values.push(v);
        }
        if let Some(ref v) = op_text {
            assignments.push("op = ?");
            values.push(v);
        }
        if let Some(ref v) = patch.tons {
            assignments.push("ton = ?");
            values.push(v);
        }
        if let Some(ref v) = patch.level {
            assignments.push("lvl = ?");
            values.push(v);
        }
        if let Some(ref v) = patch.notion {
            assignments.push("notion = ?");
            values.push(v);
        }

        if assignments.is_empty() {
            return Ok(());
        }
        values.push(&id);

        let sql = format!(
            "UPDATE trades SET {} WHERE id = ?",
            assignments.join(", ")
        );
        let conn = self.conn()?;
        conn.execute(&sql, &values[..])
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn set_trade_status(&self, id: i64, status: TradeStatus) -> Result<(), PnldeskError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE trades SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )
        .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    fn query_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, PnldeskError> {
        let op_text = filter.operation.map(|o| o.as_str().to_string());
        let status_text = filter.status.map(|s| s.as_str().to_string());
        let date_start = filter.date_start.map(|d| d.format("%Y-%m-%d").to_string());
        let date_end = filter.date_end.map(|d| d.format("%Y-%m-%d").to_string());

        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(ref v) = filter.product {
            clauses.push("prod = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.category {
            clauses.push("cat = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.shipment {
            clauses.push("ship = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.year {
            clauses.push("year = ?");
            values.push(v);
        }
        if let Some(ref v) = op_text {
            clauses.push("op = ?");
            values.push(v);
        }
        if let Some(ref v) = status_text {
            clauses.push("status = ?");
            values.push(v);
        }
        if let Some(ref v) = date_start {
            clauses.push("date >= ?");
            values.push(v);
        }
        if let Some(ref v) = date_end {
            clauses.push("date <= ?");
            values.push(v);
        }

        let mut sql = format!("SELECT {TRADE_COLUMNS} FROM trades");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        // id breaks ties between rows registered within the same instant.
        sql.push_str(" ORDER BY reg DESC, id DESC");

        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&sql)
                .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                    reason: e.to_string(),
                })?;
        let rows = stmt
            .query_map(&values[..], map_trade_row)
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;

        collect_rows(rows)
    }

    fn insert_mtm(&self, doc: &MtmDocument) -> Result<i64, PnldeskError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO mtm (trade_id, prod, cat, ship, year, mtm, pnl, date, reg)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                doc.trade_id,
                doc.product,
                doc.category,
                doc.shipment,
                doc.year,
                doc.mtm,
                doc.pnl,
                doc.date.format("%Y-%m-%d").to_string(),
                doc.reg.to_rfc3339(),
            ],
        )
        .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
            reason: e.to_string(),
        })?;

        Ok(conn.last_insert_rowid())
    }

    fn query_mtm(&self, filter: &MtmFilter) -> Result<Vec<MtmRecord>, PnldeskError> {
        let date_start = filter.date_start.map(|d| d.format("%Y-%m-%d").to_string());
        let date_end = filter.date_end.map(|d| d.format("%Y-%m-%d").to_string());

        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(ref v) = filter.trade_id {
            clauses.push("trade_id = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.product {
            clauses.push("prod = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.category {
            clauses.push("cat = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.shipment {
            clauses.push("ship = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.year {
            clauses.push("year = ?");
            values.push(v);
        }
        if let Some(ref v) = date_start {
            clauses.push("date >= ?");
            values.push(v);
        }
        if let Some(ref v) = date_end {
            clauses.push("date <= ?");
            values.push(v);
        }

        let mut sql = format!("SELECT {MTM_COLUMNS} FROM mtm");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY reg DESC, id DESC");

        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&sql)
                .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                    reason: e.to_string(),
                })?;
        let rows = stmt
            .query_map(&values[..], map_mtm_row)
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;

        collect_rows(rows)
    }

    fn mtm_by_trade(&self, trade_id: i64) -> Result<Vec<MtmRecord>, PnldeskError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {MTM_COLUMNS} FROM mtm WHERE trade_id = ?1"))
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;
        let rows = stmt
            .query_map(params![trade_id], map_mtm_row)
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;

        collect_rows(rows)
    }

    fn insert_position(&self, doc: &PositionDocument) -> Result<i64, PnldeskError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO positions (prod, cat, ship, year, pos, date, reg)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                doc.product,
                doc.category,
                doc.shipment,
                doc.year,
                doc.position,
                doc.date.format("%Y-%m-%d").to_string(),
                doc.reg.to_rfc3339(),
            ],
        )
        .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
            reason: e.to_string(),
        })?;

        Ok(conn.last_insert_rowid())
    }

    fn query_positions(
        &self,
        filter: &PositionFilter,
    ) -> Result<Vec<PositionRecord>, PnldeskError> {
        let date_start = filter.date_start.map(|d| d.format("%Y-%m-%d").to_string());
        let date_end = filter.date_end.map(|d| d.format("%Y-%m-%d").to_string());

        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<&dyn ToSql> = Vec::new();

        if let Some(ref v) = filter.product {
            clauses.push("prod = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.category {
            clauses.push("cat = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.shipment {
            clauses.push("ship = ?");
            values.push(v);
        }
        if let Some(ref v) = filter.year {
            clauses.push("year = ?");
            values.push(v);
        }
        if let Some(ref v) = date_start {
            clauses.push("date >= ?");
            values.push(v);
        }
        if let Some(ref v) = date_end {
            clauses.push("date <= ?");
            values.push(v);
        }

        let mut sql = format!("SELECT {POSITION_COLUMNS} FROM positions");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY reg DESC, id DESC");

        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&sql)
                .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                    reason: e.to_string(),
                })?;
        let rows = stmt
            .query_map(&values[..], map_position_row)
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;

        collect_rows(rows)
    }

    fn unique_values(
        &self,
        collection: Collection,
        field: &str,
    ) -> Result<Vec<String>, PnldeskError> {
        if !Self::allowed_field(collection, field) {
            return Err(PnldeskError::InvalidField {
                collection: collection.as_str().to_string(),
                field: field.to_string(),
            });
        }

        // Field name is interpolated, never caller-supplied past the
        // whitelist above.
        let sql = format!(
            "SELECT DISTINCT CAST({field} AS TEXT) AS v FROM {table}
             WHERE {field} IS NOT NULL AND CAST({field} AS TEXT) <> ''
             ORDER BY v ASC",
            table = collection.as_str(),
        );

        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&sql)
                .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                    reason: e.to_string(),
                })?;
        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;

        collect_rows(rows)
    }

    fn count(&self, collection: Collection) -> Result<usize, PnldeskError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", collection.as_str()),
                [],
                |row| row.get(0),
            )
            .map_err(|e: rusqlite::Error| PnldeskError::StoreQuery {
                reason: e.to_string(),
            })?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
    }

    fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize_schema().unwrap();
        store
    }

    fn trade_doc(product: &str, year: i32, reg_hour: u32) -> TradeDocument {
        TradeDocument {
            product: product.into(),
            category: "FOB Vessel".into(),
            shipment: "Jan".into(),
            year,
            operation: Operation::Purchase,
            tons: 100.0,
            level: 1.0,
            notion: 3674.54,
            status: TradeStatus::Active,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            reg: Utc.with_ymd_and_hms(2024, 3, 1, reg_hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn from_config_missing_path() {
        let config = EmptyConfig;
        let result = SqliteStore::from_config(&config);
        match result {
            Err(PnldeskError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn initialize_schema_is_idempotent() {
        let store = store();
        store.initialize_schema().unwrap();
        assert_eq!(store.count(Collection::Trades).unwrap(), 0);
    }

    #[test]
    fn insert_and_get_trade_round_trips() {
        let store = store();
        let id = store.insert_trade(&trade_doc("SoyBean", 2024, 9)).unwrap();

        let trade = store.get_trade(id).unwrap().expect("trade should exist");
        assert_eq!(trade.id, id);
        assert_eq!(trade.product, "SoyBean");
        assert_eq!(trade.category, "FOB Vessel");
        assert_eq!(trade.shipment, "Jan");
        assert_eq!(trade.year, 2024);
        assert_eq!(trade.operation, Operation::Purchase);
        assert_eq!(trade.status, TradeStatus::Active);
        assert_eq!(trade.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(trade.reg, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn get_trade_absent_id_is_none() {
        let store = store();
        assert!(store.get_trade(99).unwrap().is_none());
    }

    #[test]
    fn query_trades_orders_by_reg_descending() {
        let store = store();
        store.insert_trade(&trade_doc("SoyBean", 2024, 8)).unwrap();
        store.insert_trade(&trade_doc("SoyMeal", 2024, 11)).unwrap();
        store.insert_trade(&trade_doc("YelCorn", 2024, 9)).unwrap();

        let trades = store.query_trades(&TradeFilter::default()).unwrap();
        let products: Vec<&str> = trades.iter().map(|t| t.product.as_str()).collect();
        assert_eq!(products, vec!["SoyMeal", "YelCorn", "SoyBean"]);
    }

    #[test]
    fn query_trades_applies_equality_and_range_filters() {
        let store = store();
        store.insert_trade(&trade_doc("SoyBean", 2024, 8)).unwrap();
        store.insert_trade(&trade_doc("SoyBean", 2025, 9)).unwrap();
        store.insert_trade(&trade_doc("SoyMeal", 2024, 10)).unwrap();

        let filter = TradeFilter {
            product: Some("SoyBean".into()),
            year: Some(2024),
            ..TradeFilter::default()
        };
        let trades = store.query_trades(&filter).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].product, "SoyBean");
        assert_eq!(trades[0].year, 2024);

        let filter = TradeFilter {
            date_start: Some(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
            ..TradeFilter::default()
        };
        assert!(store.query_trades(&filter).unwrap().is_empty());

        let filter = TradeFilter {
            date_end: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            ..TradeFilter::default()
        };
        assert_eq!(store.query_trades(&filter).unwrap().len(), 3);
    }

    #[test]
    fn update_trade_merges_only_given_fields() {
        let store = store();
        let id = store.insert_trade(&trade_doc("SoyBean", 2024, 9)).unwrap();

        let patch = TradePatch {
            tons: Some(250.0),
            shipment: Some("Apr".into()),
            ..TradePatch::default()
        };
        store.update_trade(id, &patch).unwrap();

        let trade = store.get_trade(id).unwrap().unwrap();
        assert_eq!(trade.tons, 250.0);
        assert_eq!(trade.shipment, "Apr");
        assert_eq!(trade.product, "SoyBean");
        assert_eq!(trade.reg, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn set_trade_status_flips_to_inactive() {
        let store = store();
        let id = store.insert_trade(&trade_doc("SoyBean", 2024, 9)).unwrap();
        store.set_trade_status(id, TradeStatus::Inactive).unwrap();
        let trade = store.get_trade(id).unwrap().unwrap();
        assert_eq!(trade.status, TradeStatus::Inactive);
    }

    #[test]
    fn mtm_insert_query_and_by_trade() {
        let store = store();
        let doc = MtmDocument {
            trade_id: 7,
            product: "SoyBean".into(),
            category: "FOB Paper".into(),
            shipment: "Feb".into(),
            year: 2024,
            mtm: 0.25,
            pnl: 250.0,
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            reg: Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(),
        };
        store.insert_mtm(&doc).unwrap();
        store
            .insert_mtm(&MtmDocument {
                trade_id: 8,
                ..doc.clone()
            })
            .unwrap();

        let all = store.query_mtm(&MtmFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let by_trade = store.mtm_by_trade(7).unwrap();
        assert_eq!(by_trade.len(), 1);
        assert_eq!(by_trade[0].trade_id, 7);
        assert_eq!(by_trade[0].pnl, 250.0);
    }

    #[test]
    fn position_insert_and_query() {
        let store = store();
        let doc = PositionDocument {
            product: "YelCorn".into(),
            category: "C&F Vessel".into(),
            shipment: "May".into(),
            year: 2025,
            position: -75.0,
            date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            reg: Utc.with_ymd_and_hms(2025, 5, 2, 9, 0, 0).unwrap(),
        };
        store.insert_position(&doc).unwrap();

        let filter = PositionFilter {
            product: Some("YelCorn".into()),
            ..PositionFilter::default()
        };
        let positions = store.query_positions(&filter).unwrap();
        assert_eq!(positions.len(), 1);
        assert!(positions[0].is_short());
    }

    #[test]
    fn unique_values_sorted_and_deduplicated() {
        let store = store();
        for product in ["B", "A", "A", "C"] {
            store.insert_trade(&trade_doc(product, 2024, 9)).unwrap();
        }
        let values = store.unique_values(Collection::Trades, "prod").unwrap();
        assert_eq!(values, vec!["A", "B", "C"]);
    }

    #[test]
    fn unique_values_casts_integers_to_text() {
        let store = store();
        store.insert_trade(&trade_doc("SoyBean", 2025, 9)).unwrap();
        store.insert_trade(&trade_doc("SoyBean", 2023, 9)).unwrap();
        let values = store.unique_values(Collection::Trades, "year").unwrap();
        assert_eq!(values, vec!["2023", "2025"]);
    }

    #[test]
    fn unique_values_rejects_unknown_field() {
        let store = store();
        let result = store.unique_values(Collection::Trades, "id; DROP TABLE trades");
        assert!(matches!(result, Err(PnldeskError::InvalidField { .. })));
    }

    #[test]
    fn count_tracks_inserts() {
        let store = store();
        assert_eq!(store.count(Collection::Positions).unwrap(), 0);
        store
            .insert_position(&PositionDocument {
                product: "SoyMeal".into(),
                category: "FOB Paper".into(),
                shipment: "Jun".into(),
                year: 2024,
                position: 10.0,
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                reg: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            })
            .unwrap();
        assert_eq!(store.count(Collection::Positions).unwrap(), 1);
    }
}

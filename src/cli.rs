//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_export;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_store::SqliteStore;
use crate::domain::conversion;
use crate::domain::error::PnldeskError;
use crate::domain::mtm::MtmFilter;
use crate::domain::position::{PositionDraft, PositionFilter};
use crate::domain::queries;
use crate::domain::records;
use crate::domain::summary;
use crate::domain::trade::{Operation, TradeDraft, TradeFilter, TradePatch, TradeStatus};
use crate::ports::store_port::{Collection, StorePort};

#[derive(Parser, Debug)]
#[command(name = "pnldesk", about = "Commodity trade, MTM and PNL tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the store schema (safe to repeat)
    Init {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
    },
    /// Insert trades (one per category x month) with matching positions
    AddTrade {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        product: String,
        /// Purchase or Sale
        #[arg(long)]
        operation: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        tons: f64,
        /// Price level in percent, e.g. 100 for par
        #[arg(long, default_value_t = 100.0)]
        level: f64,
        /// Repeatable; defaults to every known category
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Repeatable; defaults to Jan, Feb, Mar
        #[arg(long = "month")]
        months: Vec<String>,
    },
    /// Record a mark-to-market valuation against a trade
    AddMtm {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        trade_id: i64,
        /// MTM level in percent
        #[arg(long)]
        mtm: f64,
        /// Defaults to the MTM value scaled by 1000
        #[arg(long)]
        pnl: Option<f64>,
    },
    /// Insert a single position observation
    AddPos {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        product: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        month: String,
        #[arg(long)]
        year: i32,
        /// Purchase or Sale; determines the sign of the stored quantity
        #[arg(long)]
        operation: String,
        #[arg(long)]
        tons: f64,
    },
    /// Update fields of an existing trade
    UpdateTrade {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        operation: Option<String>,
        #[arg(long)]
        tons: Option<f64>,
        #[arg(long)]
        level: Option<f64>,
        #[arg(long)]
        notion: Option<f64>,
    },
    /// Mark a trade inactive (the record is kept)
    DeleteTrade {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        id: i64,
    },
    /// List trades, most recent first
    ListTrades {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        operation: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        date_start: Option<String>,
        #[arg(long)]
        date_end: Option<String>,
    },
    /// List MTM records, most recent first
    ListMtm {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        date_start: Option<String>,
        #[arg(long)]
        date_end: Option<String>,
    },
    /// List position observations, most recent first
    ListPositions {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show the MTM history of one trade
    TradeMtm {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        trade_id: i64,
    },
    /// Distinct values of a field (drop-down data)
    Values {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        collection: String,
        #[arg(long)]
        field: String,
    },
    /// Per-(product, year) tonnage and notional over active trades
    PositionSummary {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
    },
    /// Per-(product, year) MTM and PNL totals
    PnlSummary {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        product: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Export a collection to CSV
    Export {
        #[arg(short, long, default_value = "config.ini")]
        config: PathBuf,
        #[arg(long)]
        collection: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Init { config } => run_init(&config),
        Command::AddTrade {
            config,
            product,
            operation,
            year,
            tons,
            level,
            categories,
            months,
        } => run_add_trade(
            &config, &product, &operation, year, tons, level, categories, months,
        ),
        Command::AddMtm {
            config,
            trade_id,
            mtm,
            pnl,
        } => run_add_mtm(&config, trade_id, mtm, pnl),
        Command::AddPos {
            config,
            product,
            category,
            month,
            year,
            operation,
            tons,
        } => run_add_pos(&config, &product, &category, &month, year, &operation, tons),
        Command::UpdateTrade {
            config,
            id,
            product,
            category,
            month,
            year,
            operation,
            tons,
            level,
            notion,
        } => run_update_trade(
            &config, id, product, category, month, year, operation, tons, level, notion,
        ),
        Command::DeleteTrade { config, id } => run_delete_trade(&config, id),
        Command::ListTrades {
            config,
            product,
            category,
            month,
            year,
            operation,
            status,
            date_start,
            date_end,
        } => run_list_trades(
            &config, product, category, month, year, operation, status, date_start, date_end,
        ),
        Command::ListMtm {
            config,
            product,
            category,
            month,
            year,
            date_start,
            date_end,
        } => run_list_mtm(&config, product, category, month, year, date_start, date_end),
        Command::ListPositions {
            config,
            product,
            category,
            month,
            year,
        } => run_list_positions(&config, product, category, month, year),
        Command::TradeMtm { config, trade_id } => run_trade_mtm(&config, trade_id),
        Command::Values {
            config,
            collection,
            field,
        } => run_values(&config, &collection, &field),
        Command::PositionSummary { config } => run_position_summary(&config),
        Command::PnlSummary {
            config,
            product,
            category,
            month,
            year,
        } => run_pnl_summary(&config, product, category, month, year),
        Command::Export {
            config,
            collection,
            output,
        } => run_export(&config, &collection, &output),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PnldeskError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn open_store(config_path: &PathBuf) -> Result<SqliteStore, ExitCode> {
    let config = load_config(config_path)?;
    let store = SqliteStore::from_config(&config).map_err(|e| report(&e))?;
    store.initialize_schema().map_err(|e| report(&e))?;
    Ok(store)
}

fn report(err: &PnldeskError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn parse_operation(value: &str) -> Result<Operation, PnldeskError> {
    Operation::parse(value).ok_or_else(|| PnldeskError::Validation {
        messages: vec![format!("operation must be Purchase or Sale, got {value}")],
    })
}

fn parse_status(value: &str) -> Result<TradeStatus, PnldeskError> {
    TradeStatus::parse(value).ok_or_else(|| PnldeskError::Validation {
        messages: vec![format!("status must be active or inactive, got {value}")],
    })
}

fn parse_collection(value: &str) -> Result<Collection, PnldeskError> {
    Collection::parse(value).ok_or_else(|| PnldeskError::Validation {
        messages: vec![format!(
            "collection must be trades, mtm or positions, got {value}"
        )],
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, PnldeskError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| PnldeskError::Validation {
        messages: vec![format!("invalid date {value}: {e}")],
    })
}

/// Insert one trade and one position per category x month combination,
/// the way the desk's entry form fans a single filled form out. Notional
/// comes from the product's conversion factor; positions take their sign
/// from the operation inside the record service.
pub fn insert_trade_batch(
    store: &dyn StorePort,
    product: &str,
    operation: Operation,
    year: i32,
    tons: f64,
    level_pct: f64,
    categories: &[String],
    months: &[String],
) -> Result<usize, PnldeskError> {
    let level = level_pct / 100.0;
    let notion = conversion::notional_value(product, level, tons);

    let mut inserted = 0;
    for category in categories {
        for month in months {
            records::add_trade(
                store,
                &TradeDraft {
                    product: product.to_string(),
                    category: category.clone(),
                    shipment: month.clone(),
                    year,
                    operation,
                    tons,
                    level,
                    notion,
                },
            )?;
            records::add_position(
                store,
                &PositionDraft {
                    product: product.to_string(),
                    category: category.clone(),
                    shipment: month.clone(),
                    year,
                    operation,
                    tons,
                },
            )?;
            inserted += 1;
        }
    }
    Ok(inserted)
}

fn run_init(config_path: &PathBuf) -> ExitCode {
    match open_store(config_path) {
        Ok(_) => {
            eprintln!("store initialized");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

#[allow(clippy::too_many_arguments)]
fn run_add_trade(
    config_path: &PathBuf,
    product: &str,
    operation: &str,
    year: i32,
    tons: f64,
    level_pct: f64,
    categories: Vec<String>,
    months: Vec<String>,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let operation = match parse_operation(operation) {
        Ok(op) => op,
        Err(e) => return report(&e),
    };

    let categories = if categories.is_empty() {
        conversion::CATEGORIES.iter().map(|c| c.to_string()).collect()
    } else {
        categories
    };
    let months = if months.is_empty() {
        vec!["Jan".to_string(), "Feb".to_string(), "Mar".to_string()]
    } else {
        months
    };

    match insert_trade_batch(
        &store, product, operation, year, tons, level_pct, &categories, &months,
    ) {
        Ok(inserted) => {
            println!("{inserted} trade(s) inserted");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_add_mtm(config_path: &PathBuf, trade_id: i64, mtm_pct: f64, pnl: Option<f64>) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let mtm = mtm_pct / 100.0;
    let pnl = pnl.unwrap_or(mtm * 1000.0);

    match records::add_mtm(&store, trade_id, mtm, pnl) {
        Ok(id) => {
            println!("mtm record {id} inserted for trade {trade_id}");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_add_pos(
    config_path: &PathBuf,
    product: &str,
    category: &str,
    month: &str,
    year: i32,
    operation: &str,
    tons: f64,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let operation = match parse_operation(operation) {
        Ok(op) => op,
        Err(e) => return report(&e),
    };

    let draft = PositionDraft {
        product: product.to_string(),
        category: category.to_string(),
        shipment: month.to_string(),
        year,
        operation,
        tons,
    };
    match records::add_position(&store, &draft) {
        Ok(id) => {
            println!("position {id} inserted");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_update_trade(
    config_path: &PathBuf,
    id: i64,
    product: Option<String>,
    category: Option<String>,
    month: Option<String>,
    year: Option<i32>,
    operation: Option<String>,
    tons: Option<f64>,
    level: Option<f64>,
    notion: Option<f64>,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let operation = match operation.as_deref().map(parse_operation).transpose() {
        Ok(op) => op,
        Err(e) => return report(&e),
    };

    let patch = TradePatch {
        product,
        category,
        shipment: month,
        year,
        operation,
        tons,
        level,
        notion,
    };
    match records::update_trade(&store, id, &patch) {
        Ok(()) => {
            println!("trade {id} updated");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_delete_trade(config_path: &PathBuf, id: i64) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    match records::delete_trade(&store, id) {
        Ok(()) => {
            println!("trade {id} marked inactive");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_list_trades(
    config_path: &PathBuf,
    product: Option<String>,
    category: Option<String>,
    month: Option<String>,
    year: Option<i32>,
    operation: Option<String>,
    status: Option<String>,
    date_start: Option<String>,
    date_end: Option<String>,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let filter = match build_trade_filter(
        product, category, month, year, operation, status, date_start, date_end,
    ) {
        Ok(f) => f,
        Err(e) => return report(&e),
    };

    match queries::get_trades(&store, &filter) {
        Ok(trades) => {
            println!(
                "{:>5}  {:<10}  {:<10} {:<12} {:<5} {:>4}  {:<8} {:>10} {:>8} {:>12}  {}",
                "id", "date", "prod", "cat", "ship", "year", "op", "ton", "lvl", "notion", "status"
            );
            for t in &trades {
                println!(
                    "{:>5}  {}  {:<10} {:<12} {:<5} {:>4}  {:<8} {:>10.2} {:>8.4} {:>12.2}  {}",
                    t.id,
                    t.date.format("%Y-%m-%d"),
                    t.product,
                    t.category,
                    t.shipment,
                    t.year,
                    t.operation.as_str(),
                    t.tons,
                    t.level,
                    t.notion,
                    t.status.as_str(),
                );
            }
            eprintln!("{} trade(s)", trades.len());
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn build_trade_filter(
    product: Option<String>,
    category: Option<String>,
    month: Option<String>,
    year: Option<i32>,
    operation: Option<String>,
    status: Option<String>,
    date_start: Option<String>,
    date_end: Option<String>,
) -> Result<TradeFilter, PnldeskError> {
    Ok(TradeFilter {
        product,
        category,
        shipment: month,
        year,
        operation: operation.as_deref().map(parse_operation).transpose()?,
        status: status.as_deref().map(parse_status).transpose()?,
        date_start: date_start.as_deref().map(parse_date).transpose()?,
        date_end: date_end.as_deref().map(parse_date).transpose()?,
    })
}

fn run_list_mtm(
    config_path: &PathBuf,
    product: Option<String>,
    category: Option<String>,
    month: Option<String>,
    year: Option<i32>,
    date_start: Option<String>,
    date_end: Option<String>,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let date_start = match date_start.as_deref().map(parse_date).transpose() {
        Ok(d) => d,
        Err(e) => return report(&e),
    };
    let date_end = match date_end.as_deref().map(parse_date).transpose() {
        Ok(d) => d,
        Err(e) => return report(&e),
    };

    let filter = MtmFilter {
        trade_id: None,
        product,
        category,
        shipment: month,
        year,
        date_start,
        date_end,
    };
    match queries::get_mtm(&store, &filter) {
        Ok(records) => {
            print_mtm_records(&records);
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn print_mtm_records(records: &[crate::domain::mtm::MtmRecord]) {
    println!(
        "{:>5}  {:>8}  {:<10}  {:<10} {:<12} {:<5} {:>4}  {:>10} {:>12}",
        "id", "trade", "date", "prod", "cat", "ship", "year", "mtm", "pnl"
    );
    for m in records {
        println!(
            "{:>5}  {:>8}  {:<10}  {:<10} {:<12} {:<5} {:>4}  {:>10.4} {:>12.2}",
            m.id,
            m.trade_id,
            m.date.format("%Y-%m-%d"),
            m.product,
            m.category,
            m.shipment,
            m.year,
            m.mtm,
            m.pnl,
        );
    }
    eprintln!("{} record(s)", records.len());
}

fn run_list_positions(
    config_path: &PathBuf,
    product: Option<String>,
    category: Option<String>,
    month: Option<String>,
    year: Option<i32>,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let filter = PositionFilter {
        product,
        category,
        shipment: month,
        year,
        date_start: None,
        date_end: None,
    };
    match queries::get_positions(&store, &filter) {
        Ok(positions) => {
            println!(
                "{:>5}  {:<10}  {:<10} {:<12} {:<5} {:>4}  {:>10}",
                "id", "date", "prod", "cat", "ship", "year", "pos"
            );
            for p in &positions {
                println!(
                    "{:>5}  {}  {:<10} {:<12} {:<5} {:>4}  {:>10.2}",
                    p.id,
                    p.date.format("%Y-%m-%d"),
                    p.product,
                    p.category,
                    p.shipment,
                    p.year,
                    p.position,
                );
            }
            eprintln!("{} position(s)", positions.len());
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_trade_mtm(config_path: &PathBuf, trade_id: i64) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    match queries::get_mtm_by_trade(&store, trade_id) {
        Ok(records) => {
            print_mtm_records(&records);
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_values(config_path: &PathBuf, collection: &str, field: &str) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let collection = match parse_collection(collection) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };
    match queries::get_unique_values(&store, collection, field) {
        Ok(values) => {
            for value in values {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_position_summary(config_path: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    match summary::get_position_summary(&store) {
        Ok(groups) => {
            println!(
                "{:<10} {:>4}  {:>12} {:>14} {:>7}",
                "prod", "year", "total_ton", "total_notion", "trades"
            );
            for g in &groups {
                println!(
                    "{:<10} {:>4}  {:>12.2} {:>14.2} {:>7}",
                    g.product, g.year, g.total_tons, g.total_notion, g.trade_count
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_pnl_summary(
    config_path: &PathBuf,
    product: Option<String>,
    category: Option<String>,
    month: Option<String>,
    year: Option<i32>,
) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let filter = MtmFilter {
        trade_id: None,
        product,
        category,
        shipment: month,
        year,
        date_start: None,
        date_end: None,
    };
    match summary::get_pnl_summary(&store, &filter) {
        Ok(groups) => {
            println!(
                "{:<10} {:>4}  {:>12} {:>12} {:>8}",
                "prod", "year", "total_mtm", "total_pnl", "records"
            );
            for g in &groups {
                println!(
                    "{:<10} {:>4}  {:>12.4} {:>12.2} {:>8}",
                    g.product, g.year, g.total_mtm, g.total_pnl, g.record_count
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

fn run_export(config_path: &PathBuf, collection: &str, output: &PathBuf) -> ExitCode {
    let store = match open_store(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let collection = match parse_collection(collection) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };

    let result = match collection {
        Collection::Trades => queries::get_trades(&store, &TradeFilter::default())
            .and_then(|trades| csv_export::export_trades(output, &trades)),
        Collection::Mtm => queries::get_mtm(&store, &MtmFilter::default())
            .and_then(|records| csv_export::export_mtm(output, &records)),
        Collection::Positions => queries::get_positions(&store, &PositionFilter::default())
            .and_then(|positions| csv_export::export_positions(output, &positions)),
    };
    match result {
        Ok(()) => {
            eprintln!("wrote {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => report(&e),
    }
}

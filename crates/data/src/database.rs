//! In-process table catalog over a loaded Predictoor export.
//!
//! The raw records are registered as the `Predictoor` table and the two
//! derived tables are materialized once at construction. Date-filtered views
//! are recomputed on every query; nothing is maintained incrementally.

use crate::aggregate::{self, DateRange};
use crate::csv_storage::CsvStorage;
use crate::error::{DataError, Result};
use crate::filter::{FilterOption, RawFilter, ALL};
use crate::models::{columns, AccuracyRow, PredictionRecord, ProfitReport, TOTAL_LABEL};
use crate::table::{ColumnInfo, DataType, Table, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Name of the raw records table.
pub const PREDICTIONS_TABLE: &str = "Predictoor";
/// Name of the per-pair accuracy table.
pub const ACCURACY_TABLE: &str = "accuracy_predictions";
/// Name of the per-pair profit table.
pub const PROFIT_TABLE: &str = "total_profit";

/// Where to load records from and how to shape the views.
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub csv_path: PathBuf,
    pub timestamp_format: String,
    pub pinned_timeframes: Vec<String>,
}

/// One request against the catalog.
#[derive(Debug, Clone)]
pub struct TableQuery {
    pub table: String,
    /// Applies to `accuracy_predictions` and `total_profit`.
    pub range: DateRange,
    /// Applies to `Predictoor`.
    pub filter: RawFilter,
}

/// Loaded records plus their materialized tables.
#[derive(Debug)]
pub struct PredictionDatabase {
    records: Vec<PredictionRecord>,
    has_exchange: bool,
    pinned_timeframes: Vec<String>,
    /// Static tables by name. The raw table is not stored here.
    derived: BTreeMap<String, Table>,
}

impl PredictionDatabase {
    /// Reads the CSV export and builds the catalog.
    ///
    /// # Errors
    /// Returns an error if the CSV cannot be read or parsed. Derived table
    /// failures are logged and do not fail the load.
    pub fn load(options: &DatabaseOptions) -> Result<Self> {
        let records = CsvStorage::read_predictions(&options.csv_path, &options.timestamp_format)?;
        tracing::info!(
            "Loaded {} predictions from {}",
            records.len(),
            options.csv_path.display()
        );
        Ok(Self::from_records(records, options.pinned_timeframes.clone()))
    }

    /// Registers `records` as the raw table and materializes derived tables.
    #[must_use]
    pub fn from_records(records: Vec<PredictionRecord>, pinned_timeframes: Vec<String>) -> Self {
        let has_exchange = records.iter().any(|r| r.exchange.is_some());
        let mut db = Self {
            records,
            has_exchange,
            pinned_timeframes,
            derived: BTreeMap::new(),
        };
        tracing::info!("Registered table {} successfully.", PREDICTIONS_TABLE);

        db.create_table(ACCURACY_TABLE, build_accuracy_table);
        db.create_table(PROFIT_TABLE, build_profit_table);

        db
    }

    fn create_table(&mut self, name: &str, build: fn(&[PredictionRecord]) -> Result<Table>) {
        match build(&self.records) {
            Ok(table) => {
                self.derived.insert(name.to_string(), table);
                tracing::info!("Table '{}' has been created and registered successfully.", name);
            }
            Err(e) => {
                tracing::error!("Error creating table '{}': {}", name, e);
            }
        }
    }

    #[must_use]
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registered table names, ordered case-insensitively.
    #[must_use]
    pub fn show_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = std::iter::once(PREDICTIONS_TABLE.to_string())
            .chain(self.derived.keys().cloned())
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        name == PREDICTIONS_TABLE || self.derived.contains_key(name)
    }

    /// Column names and types of a table.
    ///
    /// # Errors
    /// Returns `DataError::UnknownTable` if the table is not registered.
    pub fn table_info(&self, name: &str) -> Result<Vec<ColumnInfo>> {
        if name == PREDICTIONS_TABLE {
            return Ok(self.raw_columns());
        }
        self.derived
            .get(name)
            .map(|t| t.columns.clone())
            .ok_or_else(|| DataError::UnknownTable(name.to_string()))
    }

    /// Sorted distinct values of a text column of the raw table.
    ///
    /// # Errors
    /// Returns `DataError::UnknownColumn` for non-text columns.
    pub fn distinct(&self, column: &str) -> Result<Vec<String>> {
        let values: BTreeSet<&str> = match column {
            columns::TRADING_PAIR => self.records.iter().map(|r| r.trading_pair.as_str()).collect(),
            columns::TIMEFRAME => self.records.iter().map(|r| r.timeframe.as_str()).collect(),
            columns::EXCHANGE if self.has_exchange => self
                .records
                .iter()
                .filter_map(|r| r.exchange.as_deref())
                .collect(),
            _ => {
                return Err(DataError::UnknownColumn {
                    table: PREDICTIONS_TABLE.to_string(),
                    column: column.to_string(),
                })
            }
        };
        Ok(values.into_iter().map(str::to_string).collect())
    }

    /// Dropdown definitions for filtering the raw table.
    ///
    /// Text columns offer `""`, `ALL` and their distinct values; boolean
    /// columns offer `ALL`, `true` and `false`.
    #[must_use]
    pub fn filter_options(&self) -> Vec<FilterOption> {
        let mut options = Vec::new();
        for column in self.raw_columns() {
            let choices = match column.data_type {
                DataType::Varchar => {
                    let Ok(values) = self.distinct(&column.name) else {
                        continue;
                    };
                    let mut choices = vec![String::new(), ALL.to_string()];
                    choices.extend(values);
                    choices
                }
                DataType::Boolean => vec![ALL.to_string(), "true".to_string(), "false".to_string()],
                _ => continue,
            };
            options.push(FilterOption {
                column: column.name,
                choices,
            });
        }
        options
    }

    /// Runs a query against the catalog.
    ///
    /// # Errors
    /// Returns `DataError::UnknownTable` for unregistered tables and
    /// `DataError::Overflow` if a date-filtered profit sum overflows.
    pub fn query(&self, query: &TableQuery) -> Result<Table> {
        match query.table.as_str() {
            PREDICTIONS_TABLE => Ok(self.raw_table(&query.filter)),
            ACCURACY_TABLE if self.has_table(ACCURACY_TABLE) => Ok(accuracy_table(
                ACCURACY_TABLE,
                &aggregate::accuracy_report(&self.records, query.range, &self.pinned_timeframes),
                true,
            )),
            PROFIT_TABLE if self.has_table(PROFIT_TABLE) => Ok(profit_table(
                PROFIT_TABLE,
                &aggregate::profit_report(&self.records, query.range)?,
                true,
            )),
            other => self
                .derived
                .get(other)
                .cloned()
                .ok_or_else(|| DataError::UnknownTable(other.to_string())),
        }
    }

    fn raw_columns(&self) -> Vec<ColumnInfo> {
        let mut cols = vec![
            ColumnInfo::new(columns::TRADING_PAIR, DataType::Varchar),
            ColumnInfo::new(columns::TIMEFRAME, DataType::Varchar),
        ];
        if self.has_exchange {
            cols.push(ColumnInfo::new(columns::EXCHANGE, DataType::Varchar));
        }
        cols.extend([
            ColumnInfo::new(columns::TIMESTAMP, DataType::Timestamp),
            ColumnInfo::new(columns::PREDICTED_VALUE, DataType::Boolean),
            ColumnInfo::new(columns::TRUE_VALUE, DataType::Boolean),
            ColumnInfo::new(columns::STAKE, DataType::Decimal),
            ColumnInfo::new(columns::PAYOUT, DataType::Decimal),
            ColumnInfo::new(columns::FORMATTED_TIMESTAMP, DataType::Date),
        ]);
        cols
    }

    fn raw_table(&self, filter: &RawFilter) -> Table {
        let mut table = Table::new(PREDICTIONS_TABLE, self.raw_columns());
        for record in self.records.iter().filter(|r| filter.matches(r)) {
            let mut row = vec![
                Value::Text(record.trading_pair.clone()),
                Value::Text(record.timeframe.clone()),
            ];
            if self.has_exchange {
                row.push(Value::from(record.exchange.clone()));
            }
            row.extend([
                Value::DateTime(record.timestamp),
                Value::Bool(record.predicted_value),
                Value::Bool(record.true_value),
                Value::Decimal(record.stake),
                Value::Decimal(record.payout),
                Value::Date(record.date()),
            ]);
            table.push_row(row);
        }
        table
    }
}

fn build_accuracy_table(records: &[PredictionRecord]) -> Result<Table> {
    Ok(accuracy_table(
        ACCURACY_TABLE,
        &aggregate::accuracy_by_pair(records),
        false,
    ))
}

fn build_profit_table(records: &[PredictionRecord]) -> Result<Table> {
    Ok(profit_table(
        PROFIT_TABLE,
        &aggregate::profit_by_pair(records)?,
        false,
    ))
}

const ACCURACY_COUNTERS: [&str; 6] = [
    "up_predictions",
    "down_predictions",
    "total_predictions",
    "up_correct",
    "down_correct",
    "total_correct",
];
const ACCURACY_RATES: [&str; 3] = ["up_accuracy", "down_accuracy", "total_accuracy"];

fn accuracy_table(name: &str, rows: &[AccuracyRow], with_timeframe: bool) -> Table {
    let mut cols = vec![ColumnInfo::new(columns::TRADING_PAIR, DataType::Varchar)];
    if with_timeframe {
        cols.push(ColumnInfo::new(columns::TIMEFRAME, DataType::Varchar));
    }
    cols.extend(ACCURACY_COUNTERS.iter().map(|c| ColumnInfo::new(c, DataType::Bigint)));
    cols.extend(ACCURACY_RATES.iter().map(|c| ColumnInfo::new(c, DataType::Double)));

    let mut table = Table::new(name, cols);
    for row in rows {
        let s = &row.stats;
        let mut cells = vec![Value::Text(row.trading_pair.clone())];
        if with_timeframe {
            cells.push(Value::from(row.timeframe.clone()));
        }
        cells.extend([
            Value::Int(s.up_predictions),
            Value::Int(s.down_predictions),
            Value::Int(s.total_predictions),
            Value::Int(s.up_correct),
            Value::Int(s.down_correct),
            Value::Int(s.total_correct),
            Value::from(s.up_accuracy),
            Value::from(s.down_accuracy),
            Value::from(s.total_accuracy),
        ]);
        table.push_row(cells);
    }
    table
}

fn profit_table(name: &str, report: &ProfitReport, with_accuracy: bool) -> Table {
    let mut cols = vec![
        ColumnInfo::new(columns::TRADING_PAIR, DataType::Varchar),
        ColumnInfo::new("total_stake", DataType::Decimal),
        ColumnInfo::new("total_payout", DataType::Decimal),
        ColumnInfo::new("net_profit", DataType::Decimal),
    ];
    if with_accuracy {
        cols.push(ColumnInfo::new("total_accuracy", DataType::Double));
    }

    let mut table = Table::new(name, cols);
    for row in &report.rows {
        let mut cells = vec![
            Value::Text(row.trading_pair.clone()),
            Value::Decimal(row.total_stake),
            Value::Decimal(row.total_payout),
            Value::Decimal(row.net_profit),
        ];
        if with_accuracy {
            cells.push(Value::from(row.total_accuracy));
        }
        table.push_row(cells);
    }

    let mut total = vec![
        Value::from(TOTAL_LABEL),
        Value::from(report.total.total_stake),
        Value::from(report.total.total_payout),
        Value::from(report.total.net_profit),
    ];
    if with_accuracy {
        total.push(Value::Null);
    }
    table.push_row(total);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{RawSelectors, Selection};
    use crate::models::prediction::fixtures::record;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn db() -> PredictionDatabase {
        PredictionDatabase::from_records(
            vec![
                record("BTC/USDT", "5min", 1, true, true, dec!(1), dec!(1.9)),
                record("BTC/USDT", "1hr", 2, false, true, dec!(2), dec!(0)),
                record("ETH/USDT", "5min", 2, false, false, dec!(1.5), dec!(2.8)),
            ],
            Vec::new(),
        )
    }

    fn query(table: &str, range: DateRange) -> TableQuery {
        TableQuery {
            table: table.to_string(),
            range,
            filter: RawFilter::default(),
        }
    }

    #[test]
    fn test_show_tables() {
        assert_eq!(
            db().show_tables(),
            vec!["accuracy_predictions", "Predictoor", "total_profit"]
        );
    }

    #[test]
    fn test_table_info_raw() {
        let cols = db().table_info(PREDICTIONS_TABLE).unwrap();
        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "TradingPair",
                "TimeFrame",
                "Exchange",
                "Timestamp",
                "PredictedValue",
                "TrueValue",
                "Stake",
                "Payout",
                "FormattedTimestamp"
            ]
        );
        assert!(matches!(
            db().table_info("missing"),
            Err(DataError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_exchange_column_hidden_when_absent() {
        let mut r = record("BTC/USDT", "5min", 1, true, true, dec!(1), dec!(1));
        r.exchange = None;
        let db = PredictionDatabase::from_records(vec![r], Vec::new());
        let cols = db.table_info(PREDICTIONS_TABLE).unwrap();
        assert!(cols.iter().all(|c| c.name != "Exchange"));
        assert!(db.distinct("Exchange").is_err());
    }

    #[test]
    fn test_distinct_sorted() {
        assert_eq!(db().distinct("TimeFrame").unwrap(), vec!["1hr", "5min"]);
        assert!(db().distinct("Stake").is_err());
    }

    #[test]
    fn test_filter_options() {
        let options = db().filter_options();
        let pair = options.iter().find(|o| o.column == "TradingPair").unwrap();
        assert_eq!(pair.choices, vec!["", "ALL", "BTC/USDT", "ETH/USDT"]);
        let predicted = options.iter().find(|o| o.column == "PredictedValue").unwrap();
        assert_eq!(predicted.choices, vec!["ALL", "true", "false"]);
        assert!(options.iter().all(|o| o.column != "Stake"));
    }

    #[test]
    fn test_profit_view_empty_range_keeps_null_total() {
        let db = db();
        let table = db
            .query(&query("total_profit", DateRange::single(day(30))))
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][0], Value::from("TOTAL"));
        assert!(table.rows[0][1].is_null());

        let info = db.table_info(PROFIT_TABLE).unwrap();
        assert_eq!(info.len(), 4);
    }

    #[test]
    fn test_profit_view_total_matches_rows() {
        let table = db()
            .query(&query(PROFIT_TABLE, DateRange::new(day(1), day(2))))
            .unwrap();
        assert_eq!(table.len(), 3);
        let stake_col = table.column_index("total_stake").unwrap();
        let sum: Decimal = table.rows[..2]
            .iter()
            .map(|r| match r[stake_col] {
                Value::Decimal(d) => d,
                _ => Decimal::ZERO,
            })
            .sum();
        assert_eq!(table.rows[2][stake_col], Value::Decimal(sum));
        let acc_col = table.column_index("total_accuracy").unwrap();
        assert_eq!(table.rows[0][acc_col], Value::Float(50.0));
        assert!(table.rows[2][acc_col].is_null());
    }

    #[test]
    fn test_accuracy_view_has_timeframe_column() {
        let table = db()
            .query(&query(ACCURACY_TABLE, DateRange::single(day(2))))
            .unwrap();
        assert_eq!(table.columns[1].name, "TimeFrame");
        // (BTC,1hr), (ETH,5min), (BTC,all), (ETH,all)
        assert_eq!(table.len(), 4);
        assert!(table.rows[2][1].is_null());
    }

    #[test]
    fn test_raw_query_ignores_dates_and_applies_filter() {
        let db = db();
        let all = db
            .query(&query(PREDICTIONS_TABLE, DateRange::single(day(30))))
            .unwrap();
        assert_eq!(all.len(), 3);

        let filter = RawFilter::from_selectors(&RawSelectors {
            timeframe: Some("5min".to_string()),
            true_value: Some("false".to_string()),
            ..RawSelectors::default()
        })
        .unwrap();
        assert_eq!(filter.trading_pair, Selection::Any);
        let filtered = db
            .query(&TableQuery {
                table: PREDICTIONS_TABLE.to_string(),
                range: DateRange::single(day(30)),
                filter,
            })
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows[0][0], Value::from("ETH/USDT"));
    }

    #[test]
    fn test_failed_derived_table_is_skipped() {
        let db = PredictionDatabase::from_records(
            vec![
                record("BTC/USDT", "5min", 1, true, true, Decimal::MAX, dec!(0)),
                record("BTC/USDT", "5min", 1, true, true, Decimal::MAX, dec!(0)),
            ],
            Vec::new(),
        );
        assert_eq!(db.show_tables(), vec!["accuracy_predictions", "Predictoor"]);
        assert!(matches!(
            db.query(&query(PROFIT_TABLE, DateRange::single(day(1)))),
            Err(DataError::UnknownTable(_))
        ));
        assert!(db
            .query(&query(ACCURACY_TABLE, DateRange::single(day(1))))
            .is_ok());
    }

    #[test]
    fn test_unknown_table() {
        assert!(matches!(
            db().query(&query("nope", DateRange::single(day(1)))),
            Err(DataError::UnknownTable(_))
        ));
    }
}

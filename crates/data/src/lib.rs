//! Prediction data ingestion and aggregation for Predictoor stats.
//!
//! This crate provides:
//! - The prediction record model and aggregate row types
//! - CSV ingestion and table export
//! - The accuracy and profit aggregation engine
//! - An in-process table catalog serving raw and derived tables

pub mod aggregate;
pub mod csv_storage;
pub mod database;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod models;
pub mod table;

// Re-export commonly used types
pub use aggregate::DateRange;
pub use csv_storage::CsvStorage;
pub use database::{
    DatabaseOptions, PredictionDatabase, TableQuery, ACCURACY_TABLE, PREDICTIONS_TABLE,
    PROFIT_TABLE,
};
pub use error::DataError;
pub use filter::{FilterOption, RawFilter, RawSelectors, Selection};
pub use formatter::TableFormatter;
pub use table::{BarChart, ChartSeries, ColumnInfo, DataType, Table, Value};

// Re-export models
pub use models::{
    AccuracyRow, AccuracyStats, PredictionRecord, ProfitReport, ProfitRow, ProfitTotal,
};

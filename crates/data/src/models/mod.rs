//! Data models for Predictoor statistics.
//!
//! Monetary amounts use `rust_decimal::Decimal`; hit rates are `f64` percents.

pub mod prediction;
pub mod report;

pub use prediction::{columns, PredictionRecord};
pub use report::{
    percentage, AccuracyRow, AccuracyStats, ProfitReport, ProfitRow, ProfitTotal, TOTAL_LABEL,
};

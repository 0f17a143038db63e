//! Error type shared by ingestion, aggregation and the table catalog.

use thiserror::Error;

/// Errors from loading, aggregating, or querying prediction data.
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error opening or writing a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the CSV header.
    #[error("missing column '{0}' in CSV header")]
    MissingColumn(&'static str),

    /// A field could not be parsed into its column type.
    #[error("line {line}: invalid {column} value '{value}': {reason}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },

    /// Decimal sum exceeded the representable range.
    #[error("overflow while summing {0}")]
    Overflow(&'static str),

    /// The requested table is not registered.
    #[error("table '{0}' does not exist")]
    UnknownTable(String),

    /// The requested column is not part of the table.
    #[error("column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// A filter selector could not be interpreted.
    #[error("invalid filter value '{value}' for {column}")]
    InvalidFilter { column: String, value: String },
}

pub type Result<T> = std::result::Result<T, DataError>;

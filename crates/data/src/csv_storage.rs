use crate::error::{DataError, Result};
use crate::models::{columns, PredictionRecord};
use crate::table::Table;
use chrono::NaiveDateTime;
use csv::{Reader, StringRecord, Writer};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

pub struct CsvStorage;

/// Positions of the known columns within a CSV header.
struct HeaderLayout {
    trading_pair: usize,
    timeframe: usize,
    timestamp: usize,
    predicted_value: usize,
    true_value: usize,
    stake: usize,
    payout: usize,
    exchange: Option<usize>,
}

impl HeaderLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &'static str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(DataError::MissingColumn(name));

        Ok(Self {
            trading_pair: require(columns::TRADING_PAIR)?,
            timeframe: require(columns::TIMEFRAME)?,
            timestamp: require(columns::TIMESTAMP)?,
            predicted_value: require(columns::PREDICTED_VALUE)?,
            true_value: require(columns::TRUE_VALUE)?,
            stake: require(columns::STAKE)?,
            payout: require(columns::PAYOUT)?,
            exchange: find(columns::EXCHANGE),
        })
    }
}

/// Parser for one data row, bound to a header layout and timestamp format.
struct RowParser<'a> {
    layout: HeaderLayout,
    timestamp_format: &'a str,
}

impl RowParser<'_> {
    fn parse(&self, record: &StringRecord, line: u64) -> Result<PredictionRecord> {
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let raw_ts = field(self.layout.timestamp);
        let timestamp = NaiveDateTime::parse_from_str(raw_ts, self.timestamp_format).map_err(
            |e| DataError::InvalidField {
                line,
                column: columns::TIMESTAMP,
                value: raw_ts.to_string(),
                reason: format!("expected format '{}': {}", self.timestamp_format, e),
            },
        )?;

        Ok(PredictionRecord {
            trading_pair: field(self.layout.trading_pair).to_string(),
            timeframe: field(self.layout.timeframe).to_string(),
            exchange: self
                .layout
                .exchange
                .map(|idx| field(idx).to_string())
                .filter(|s| !s.is_empty()),
            timestamp,
            predicted_value: parse_bool(
                field(self.layout.predicted_value),
                columns::PREDICTED_VALUE,
                line,
            )?,
            true_value: parse_bool(field(self.layout.true_value), columns::TRUE_VALUE, line)?,
            stake: parse_decimal(field(self.layout.stake), columns::STAKE, line)?,
            payout: parse_decimal(field(self.layout.payout), columns::PAYOUT, line)?,
        })
    }
}

/// Parses the boolean spellings found in spreadsheet and pandas exports.
pub(crate) fn parse_bool_token(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_bool(value: &str, column: &'static str, line: u64) -> Result<bool> {
    parse_bool_token(value).ok_or_else(|| DataError::InvalidField {
        line,
        column,
        value: value.to_string(),
        reason: "expected a boolean".to_string(),
    })
}

fn parse_decimal(value: &str, column: &'static str, line: u64) -> Result<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| DataError::InvalidField {
            line,
            column,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl CsvStorage {
    /// Reads prediction records from a Predictoor CSV export.
    ///
    /// Columns are matched by header name; `Exchange` is optional and any
    /// other extra column is ignored.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened
    /// - A required column is missing from the header
    /// - A timestamp, boolean or number fails to parse
    pub fn read_predictions(
        path: impl AsRef<Path>,
        timestamp_format: &str,
    ) -> Result<Vec<PredictionRecord>> {
        let file = File::open(path.as_ref())?;
        let records = Self::read_predictions_from(file, timestamp_format)?;
        tracing::debug!(
            "Read {} prediction records from {}",
            records.len(),
            path.as_ref().display()
        );
        Ok(records)
    }

    /// Reads prediction records from any CSV source.
    ///
    /// # Errors
    /// Same as [`CsvStorage::read_predictions`], minus file opening.
    pub fn read_predictions_from<R: Read>(
        source: R,
        timestamp_format: &str,
    ) -> Result<Vec<PredictionRecord>> {
        let mut reader = Reader::from_reader(source);
        let parser = RowParser {
            layout: HeaderLayout::from_headers(reader.headers()?)?,
            timestamp_format,
        };

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // Header is line 1.
            let line = record
                .position()
                .map_or(idx as u64 + 2, |pos| pos.line());
            records.push(parser.parse(&record, line)?);
        }

        Ok(records)
    }

    /// Writes any table to a CSV file.
    ///
    /// Format: one header row of column names, NULL cells as empty fields.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_table(path: impl AsRef<Path>, table: &Table) -> Result<()> {
        let file = File::create(path.as_ref())?;
        Self::write_table_to(file, table)
    }

    /// Writes any table as CSV to a writer.
    ///
    /// # Errors
    /// Returns error if writing fails
    pub fn write_table_to<W: Write>(sink: W, table: &Table) -> Result<()> {
        let mut writer = Writer::from_writer(sink);

        writer.write_record(table.columns.iter().map(|c| c.name.as_str()))?;
        for row in &table.rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }

        writer.flush()?;
        Ok(())
    }
}

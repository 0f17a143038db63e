//! `report` command: print one table for a date range, optionally exporting it as CSV.

use super::{database_options, open_database, SourceArgs};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use predictoor_data::{
    CsvStorage, DateRange, PredictionDatabase, RawFilter, RawSelectors, Table, TableFormatter,
    TableQuery, PREDICTIONS_TABLE, PROFIT_TABLE,
};
use std::path::PathBuf;

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Table to print (`Predictoor`, `accuracy_predictions` or `total_profit`)
    #[arg(short, long, default_value = PROFIT_TABLE)]
    pub table: String,

    /// First day of the range, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the range, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Raw table filter on TradingPair (empty or ALL means no filter)
    #[arg(long)]
    pub trading_pair: Option<String>,

    /// Raw table filter on TimeFrame
    #[arg(long)]
    pub timeframe: Option<String>,

    /// Raw table filter on Exchange
    #[arg(long)]
    pub exchange: Option<String>,

    /// Raw table filter on PredictedValue (true/false/ALL)
    #[arg(long)]
    pub predicted_value: Option<String>,

    /// Raw table filter on TrueValue (true/false/ALL)
    #[arg(long)]
    pub true_value: Option<String>,

    /// Also write the table to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Decimal places for floating-point cells (overrides `report.float_precision`)
    #[arg(long)]
    pub precision: Option<usize>,
}

impl ReportArgs {
    fn range(&self, today: NaiveDate) -> DateRange {
        DateRange::new(self.start.unwrap_or(today), self.end.unwrap_or(today))
    }

    fn selectors(&self) -> RawSelectors {
        RawSelectors {
            trading_pair: self.trading_pair.clone(),
            timeframe: self.timeframe.clone(),
            exchange: self.exchange.clone(),
            predicted_value: self.predicted_value.clone(),
            true_value: self.true_value.clone(),
        }
    }

    fn query(&self, today: NaiveDate) -> Result<TableQuery> {
        let range = self.range(today);
        if range.is_empty() {
            tracing::warn!(
                "Start date {} is after end date {}; the range selects nothing",
                range.start,
                range.end
            );
        }
        let filter = RawFilter::from_selectors(&self.selectors())?;
        if self.table != PREDICTIONS_TABLE && !filter.is_unfiltered() {
            tracing::warn!(
                "Column filters only apply to {}; ignoring them for {}",
                PREDICTIONS_TABLE,
                self.table
            );
        }
        Ok(TableQuery {
            table: self.table.clone(),
            range,
            filter,
        })
    }
}

/// Runs the report command.
///
/// # Errors
/// Returns an error if the export cannot be loaded, the table is unknown,
/// a filter is malformed or the CSV export cannot be written.
pub async fn run_report(args: ReportArgs) -> Result<()> {
    let config = args.source.load_config()?;
    let options = database_options(&config);
    let precision = args.precision.unwrap_or(config.report.float_precision);

    let db = tokio::task::spawn_blocking(move || open_database(&options))
        .await
        .context("Loader task panicked")??;

    let table = build_report(&db, &args, Local::now().date_naive())?;
    println!("{}", TableFormatter::format(&table, precision));

    if let Some(path) = &args.output {
        CsvStorage::write_table(path, &table)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {} rows to {}", table.len(), path.display());
    }

    Ok(())
}

fn build_report(db: &PredictionDatabase, args: &ReportArgs, today: NaiveDate) -> Result<Table> {
    let query = args.query(today)?;
    let table = db
        .query(&query)
        .with_context(|| format!("Failed to query table '{}'", query.table))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use predictoor_data::{Value, ACCURACY_TABLE};
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ReportArgs,
    }

    fn parse(argv: &[&str]) -> ReportArgs {
        let mut full = vec!["report"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    fn sample_db() -> (NamedTempFile, PredictionDatabase) {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "TradingPair,TimeFrame,Timestamp,PredictedValue,TrueValue,Stake,Payout"
        )
        .unwrap();
        writeln!(file, "BTC/USDT,5min,01/15/2024 10:00,true,true,1,1.9").unwrap();
        writeln!(file, "BTC/USDT,1hr,01/15/2024 11:00,false,true,2,0").unwrap();
        writeln!(file, "ETH/USDT,5min,01/16/2024 09:00,false,false,1.5,2.8").unwrap();
        file.flush().unwrap();

        let options = predictoor_data::DatabaseOptions {
            csv_path: file.path().to_path_buf(),
            timestamp_format: "%m/%d/%Y %H:%M".to_string(),
            pinned_timeframes: Vec::new(),
        };
        let db = PredictionDatabase::load(&options).unwrap();
        (file, db)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.table, PROFIT_TABLE);
        assert_eq!(args.range(day(20)), DateRange::single(day(20)));
        assert!(args.output.is_none());
    }

    #[test]
    fn test_profit_report_for_range() {
        let (_file, db) = sample_db();
        let args = parse(&["--start", "2024-01-15", "--end", "2024-01-16"]);
        let table = build_report(&db, &args, day(20)).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0][0], Value::from("BTC/USDT"));
        assert_eq!(table.rows[0][1], Value::Decimal(dec!(3)));
        assert_eq!(table.rows[2][0], Value::from("TOTAL"));
    }

    #[test]
    fn test_today_default_selects_nothing() {
        let (_file, db) = sample_db();
        let args = parse(&["--table", ACCURACY_TABLE]);
        let table = build_report(&db, &args, day(20)).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_raw_filters() {
        let (_file, db) = sample_db();
        let args = parse(&[
            "--table",
            PREDICTIONS_TABLE,
            "--trading-pair",
            "BTC/USDT",
            "--predicted-value",
            "true",
        ]);
        let table = build_report(&db, &args, day(20)).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_bad_boolean_filter_is_an_error() {
        let (_file, db) = sample_db();
        let args = parse(&["--table", PREDICTIONS_TABLE, "--true-value", "maybe"]);
        assert!(build_report(&db, &args, day(20)).is_err());
    }

    #[test]
    fn test_filters_do_not_narrow_aggregate_views() {
        let (_file, db) = sample_db();
        let args = parse(&[
            "--start",
            "2024-01-15",
            "--end",
            "2024-01-16",
            "--trading-pair",
            "ETH/USDT",
        ]);
        let query = args.query(day(20)).unwrap();
        assert!(!query.filter.is_unfiltered());

        let table = build_report(&db, &args, day(20)).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_unknown_table_is_an_error() {
        let (_file, db) = sample_db();
        let args = parse(&["--table", "nope"]);
        assert!(build_report(&db, &args, day(20)).is_err());
    }
}

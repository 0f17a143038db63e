//! Aggregation engine behind the accuracy and profit views.
//!
//! Groups are keyed with `BTreeMap` so output rows come out ordered by trading
//! pair, then timeframe. Decimal sums are checked; an overflow fails the whole
//! aggregation rather than producing a wrapped total.

use crate::error::{DataError, Result};
use crate::models::{
    AccuracyRow, AccuracyStats, PredictionRecord, ProfitReport, ProfitRow, ProfitTotal,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive calendar-date range, matching SQL `BETWEEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range covering a single day.
    #[must_use]
    pub const fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// True when `start > end`; such a range selects nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn contains_record(&self, record: &PredictionRecord) -> bool {
        self.contains(record.date())
    }
}

fn in_range<'a>(
    records: &'a [PredictionRecord],
    range: DateRange,
) -> impl Iterator<Item = &'a PredictionRecord> + 'a {
    records.iter().filter(move |r| range.contains_record(r))
}

fn group_by_pair<'a, I>(records: I) -> BTreeMap<&'a str, Vec<&'a PredictionRecord>>
where
    I: IntoIterator<Item = &'a PredictionRecord>,
{
    let mut groups: BTreeMap<&str, Vec<&PredictionRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.trading_pair.as_str())
            .or_default()
            .push(record);
    }
    groups
}

fn accuracy_row(pair: &str, timeframe: Option<&str>, group: &[&PredictionRecord]) -> AccuracyRow {
    AccuracyRow {
        trading_pair: pair.to_string(),
        timeframe: timeframe.map(str::to_string),
        stats: AccuracyStats::from_records(group.iter().copied()),
    }
}

/// Accuracy per trading pair across all timeframes and dates.
///
/// This is the static `accuracy_predictions` table built at startup.
#[must_use]
pub fn accuracy_by_pair(records: &[PredictionRecord]) -> Vec<AccuracyRow> {
    group_by_pair(records)
        .into_iter()
        .map(|(pair, group)| accuracy_row(pair, None, &group))
        .collect()
}

/// Date-filtered accuracy view.
///
/// Rows come in three blocks:
/// 1. one row per `(pair, timeframe)` with records in range;
/// 2. for each pinned timeframe, one row per pair with records in that timeframe;
/// 3. one all-timeframes row per pair (`timeframe = None`).
#[must_use]
pub fn accuracy_report(
    records: &[PredictionRecord],
    range: DateRange,
    pinned_timeframes: &[String],
) -> Vec<AccuracyRow> {
    let scoped: Vec<&PredictionRecord> = in_range(records, range).collect();
    let mut rows = Vec::new();

    let mut by_pair_timeframe: BTreeMap<(&str, &str), Vec<&PredictionRecord>> = BTreeMap::new();
    for &record in &scoped {
        by_pair_timeframe
            .entry((record.trading_pair.as_str(), record.timeframe.as_str()))
            .or_default()
            .push(record);
    }
    rows.extend(
        by_pair_timeframe
            .iter()
            .map(|((pair, timeframe), group)| accuracy_row(pair, Some(*timeframe), group)),
    );

    for pinned in pinned_timeframes {
        let in_timeframe = scoped
            .iter()
            .copied()
            .filter(|r| &r.timeframe == pinned);
        rows.extend(
            group_by_pair(in_timeframe)
                .into_iter()
                .map(|(pair, group)| accuracy_row(pair, Some(pinned.as_str()), &group)),
        );
    }

    rows.extend(
        group_by_pair(scoped.iter().copied())
            .into_iter()
            .map(|(pair, group)| accuracy_row(pair, None, &group)),
    );

    rows
}

/// Running stake/payout sums with overflow checks.
#[derive(Debug, Default, Clone, Copy)]
struct ProfitSums {
    stake: Decimal,
    payout: Decimal,
}

impl ProfitSums {
    fn add(&mut self, record: &PredictionRecord) -> Result<()> {
        self.stake = self
            .stake
            .checked_add(record.stake)
            .ok_or(DataError::Overflow("Stake"))?;
        self.payout = self
            .payout
            .checked_add(record.payout)
            .ok_or(DataError::Overflow("Payout"))?;
        Ok(())
    }

    fn net(&self) -> Result<Decimal> {
        self.payout
            .checked_sub(self.stake)
            .ok_or(DataError::Overflow("net_profit"))
    }

    fn of<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a PredictionRecord>,
    {
        let mut sums = Self::default();
        for record in records {
            sums.add(record)?;
        }
        Ok(sums)
    }
}

fn profit_rows<'a, I>(records: I, with_accuracy: bool) -> Result<(Vec<ProfitRow>, ProfitTotal)>
where
    I: IntoIterator<Item = &'a PredictionRecord>,
{
    let groups = group_by_pair(records);
    let mut rows = Vec::with_capacity(groups.len());
    let mut grand = ProfitSums::default();

    for (pair, group) in &groups {
        let sums = ProfitSums::of(group.iter().copied())?;
        for record in group {
            grand.add(record)?;
        }
        rows.push(ProfitRow {
            trading_pair: (*pair).to_string(),
            total_stake: sums.stake,
            total_payout: sums.payout,
            net_profit: sums.net()?,
            total_accuracy: if with_accuracy {
                AccuracyStats::from_records(group.iter().copied()).total_accuracy
            } else {
                None
            },
        });
    }

    let total = if groups.is_empty() {
        ProfitTotal::default()
    } else {
        ProfitTotal {
            total_stake: Some(grand.stake),
            total_payout: Some(grand.payout),
            net_profit: Some(grand.net()?),
        }
    };

    Ok((rows, total))
}

/// Stake, payout and net profit per pair plus a grand total, over all dates.
///
/// This is the static `total_profit` table built at startup.
///
/// # Errors
/// Returns `DataError::Overflow` if a sum leaves the decimal range.
pub fn profit_by_pair(records: &[PredictionRecord]) -> Result<ProfitReport> {
    let (rows, total) = profit_rows(records, false)?;
    Ok(ProfitReport { rows, total })
}

/// Date-filtered profit view with each pair's overall accuracy.
///
/// # Errors
/// Returns `DataError::Overflow` if a sum leaves the decimal range.
pub fn profit_report(records: &[PredictionRecord], range: DateRange) -> Result<ProfitReport> {
    let (rows, total) = profit_rows(in_range(records, range), true)?;
    Ok(ProfitReport { rows, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::prediction::fixtures::record;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample() -> Vec<PredictionRecord> {
        vec![
            record("BTC/USDT", "5min", 1, true, true, dec!(1.0), dec!(1.9)),
            record("BTC/USDT", "5min", 2, false, true, dec!(2.0), dec!(0)),
            record("BTC/USDT", "1hr", 2, true, true, dec!(3.0), dec!(5.5)),
            record("ETH/USDT", "5min", 3, false, false, dec!(1.5), dec!(2.8)),
            record("ETH/USDT", "1hr", 5, true, false, dec!(4.0), dec!(0)),
        ]
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(day(2), day(3));
        assert!(!range.contains(day(1)));
        assert!(range.contains(day(2)));
        assert!(range.contains(day(3)));
        assert!(!range.contains(day(4)));
        assert!(DateRange::new(day(3), day(2)).is_empty());
    }

    #[test]
    fn test_accuracy_by_pair() {
        let rows = accuracy_by_pair(&sample());
        assert_eq!(rows.len(), 2);

        let btc = &rows[0];
        assert_eq!(btc.trading_pair, "BTC/USDT");
        assert_eq!(btc.timeframe, None);
        assert_eq!(btc.stats.total_predictions, 3);
        assert_eq!(btc.stats.up_predictions, 2);
        assert_eq!(btc.stats.up_correct, 2);
        assert_eq!(btc.stats.down_correct, 0);
        assert_eq!(btc.stats.down_accuracy, Some(0.0));

        let eth = &rows[1];
        assert_eq!(eth.stats.total_correct, 1);
        assert_eq!(eth.stats.total_accuracy, Some(50.0));
    }

    #[test]
    fn test_accuracy_report_blocks() {
        let records = sample();
        let range = DateRange::new(day(1), day(3));
        let rows = accuracy_report(&records, range, &["1hr".to_string()]);

        let keys: Vec<(&str, Option<&str>)> = rows
            .iter()
            .map(|r| (r.trading_pair.as_str(), r.timeframe.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("BTC/USDT", Some("1hr")),
                ("BTC/USDT", Some("5min")),
                ("ETH/USDT", Some("5min")),
                ("BTC/USDT", Some("1hr")),
                ("BTC/USDT", None),
                ("ETH/USDT", None),
            ]
        );

        // ETH 1hr on day 5 is out of range.
        let eth_all = rows.last().unwrap();
        assert_eq!(eth_all.stats.total_predictions, 1);
    }

    #[test]
    fn test_accuracy_report_empty_range() {
        let rows = accuracy_report(&sample(), DateRange::single(day(20)), &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_correct_never_exceeds_predictions() {
        let rows = accuracy_report(&sample(), DateRange::new(day(1), day(31)), &[]);
        for row in rows {
            assert!(row.stats.up_correct <= row.stats.up_predictions);
            assert!(row.stats.down_correct <= row.stats.down_predictions);
            assert_eq!(
                row.stats.total_predictions,
                row.stats.up_predictions + row.stats.down_predictions
            );
        }
    }

    #[test]
    fn test_profit_by_pair_totals() {
        let records = sample();
        let report = profit_by_pair(&records).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].total_stake, dec!(6.0));
        assert_eq!(report.rows[0].total_payout, dec!(7.4));
        assert_eq!(report.rows[0].net_profit, dec!(1.4));
        assert_eq!(report.rows[0].total_accuracy, None);

        let manual_stake: Decimal = records.iter().map(|r| r.stake).sum();
        assert_eq!(report.total.total_stake, Some(manual_stake));
        let row_sum: Decimal = report.rows.iter().map(|r| r.net_profit).sum();
        assert_eq!(report.total.net_profit, Some(row_sum));
    }

    #[test]
    fn test_profit_report_filters_and_joins_accuracy() {
        let report = profit_report(&sample(), DateRange::single(day(2))).unwrap();

        assert_eq!(report.rows.len(), 1);
        let btc = &report.rows[0];
        assert_eq!(btc.total_stake, dec!(5.0));
        assert_eq!(btc.net_profit, dec!(0.5));
        assert_eq!(btc.total_accuracy, Some(50.0));
        assert_eq!(report.total.total_stake, Some(dec!(5.0)));
    }

    #[test]
    fn test_profit_report_empty_range_has_null_total() {
        let report = profit_report(&sample(), DateRange::single(day(30))).unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.total, ProfitTotal::default());
    }

    #[test]
    fn test_profit_overflow() {
        let records = vec![
            record("BTC/USDT", "5min", 1, true, true, Decimal::MAX, dec!(0)),
            record("BTC/USDT", "5min", 1, true, true, Decimal::MAX, dec!(0)),
        ];
        assert!(matches!(
            profit_by_pair(&records),
            Err(DataError::Overflow("Stake"))
        ));
    }
}

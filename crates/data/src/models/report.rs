//! Aggregate row types for the accuracy and profit views.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::prediction::PredictionRecord;

/// Label used for the grand-total row of profit tables.
pub const TOTAL_LABEL: &str = "TOTAL";

/// Prediction counters and hit rates for a group of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyStats {
    pub up_predictions: u64,
    pub down_predictions: u64,
    pub total_predictions: u64,
    pub up_correct: u64,
    pub down_correct: u64,
    pub total_correct: u64,
    /// Percent of up predictions that were correct; `None` without up predictions.
    pub up_accuracy: Option<f64>,
    /// Percent of down predictions that were correct; `None` without down predictions.
    pub down_accuracy: Option<f64>,
    /// Percent of all predictions that were correct; `None` for an empty group.
    pub total_accuracy: Option<f64>,
}

impl AccuracyStats {
    /// Computes counters and guarded percentages in a single pass.
    #[must_use]
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a PredictionRecord>,
    {
        let mut stats = Self::default();
        for record in records {
            stats.push(record);
        }
        stats.finish()
    }

    fn push(&mut self, record: &PredictionRecord) {
        self.total_predictions += 1;
        if record.is_up() {
            self.up_predictions += 1;
            if record.is_correct() {
                self.up_correct += 1;
            }
        } else {
            self.down_predictions += 1;
            if record.is_correct() {
                self.down_correct += 1;
            }
        }
        if record.is_correct() {
            self.total_correct += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.up_accuracy = percentage(self.up_correct, self.up_predictions);
        self.down_accuracy = percentage(self.down_correct, self.down_predictions);
        self.total_accuracy = percentage(self.total_correct, self.total_predictions);
        self
    }
}

/// `part * 100 / whole`, or `None` when `whole` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: u64, whole: u64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 * 100.0 / whole as f64)
    }
}

/// One row of an accuracy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRow {
    pub trading_pair: String,
    /// `None` when the row covers every timeframe of the pair.
    pub timeframe: Option<String>,
    #[serde(flatten)]
    pub stats: AccuracyStats,
}

/// Stake and payout totals for one trading pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitRow {
    pub trading_pair: String,
    pub total_stake: Decimal,
    pub total_payout: Decimal,
    pub net_profit: Decimal,
    /// Only populated in the date-filtered view.
    pub total_accuracy: Option<f64>,
}

/// The `TOTAL` row of a profit table.
///
/// Sums are `None` when no record was in scope, mirroring `SUM` over an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitTotal {
    pub total_stake: Option<Decimal>,
    pub total_payout: Option<Decimal>,
    pub net_profit: Option<Decimal>,
}

/// Per-pair profit rows followed by the grand total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitReport {
    pub rows: Vec<ProfitRow>,
    pub total: ProfitTotal,
}

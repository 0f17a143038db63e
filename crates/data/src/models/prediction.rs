//! Prediction record model for Predictoor exports.
//!
//! One record is a single up/down prediction submitted for a trading pair on
//! a given timeframe, together with its realized outcome and economics.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Column names of the raw `Predictoor` table, in display order.
pub mod columns {
    pub const TRADING_PAIR: &str = "TradingPair";
    pub const TIMEFRAME: &str = "TimeFrame";
    pub const EXCHANGE: &str = "Exchange";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const PREDICTED_VALUE: &str = "PredictedValue";
    pub const TRUE_VALUE: &str = "TrueValue";
    pub const STAKE: &str = "Stake";
    pub const PAYOUT: &str = "Payout";
    pub const FORMATTED_TIMESTAMP: &str = "FormattedTimestamp";
}

/// A single Predictoor prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Asset pair being predicted (e.g. "BTC/USDT").
    pub trading_pair: String,
    /// Prediction horizon (e.g. "5min", "1hr").
    pub timeframe: String,
    /// Source exchange, when the export carries one.
    pub exchange: Option<String>,
    /// When the prediction was made.
    pub timestamp: NaiveDateTime,
    /// Predicted direction: `true` means up.
    pub predicted_value: bool,
    /// Realized direction: `true` means up.
    pub true_value: bool,
    /// Amount wagered.
    pub stake: Decimal,
    /// Amount returned.
    pub payout: Decimal,
}

impl PredictionRecord {
    /// Calendar date of the prediction (the `FormattedTimestamp` column).
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Whether the prediction was for an upward move.
    #[must_use]
    pub const fn is_up(&self) -> bool {
        self.predicted_value
    }

    /// Whether the predicted direction matched the realized one.
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        self.predicted_value == self.true_value
    }

    /// Payout minus stake.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.payout - self.stake
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::NaiveDate;

    /// Builds a record on `day` of January 2024 at noon.
    pub fn record(
        pair: &str,
        timeframe: &str,
        day: u32,
        predicted: bool,
        actual: bool,
        stake: Decimal,
        payout: Decimal,
    ) -> PredictionRecord {
        PredictionRecord {
            trading_pair: pair.to_string(),
            timeframe: timeframe.to_string(),
            exchange: Some("binance".to_string()),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            predicted_value: predicted,
            true_value: actual,
            stake,
            payout,
        }
    }
}

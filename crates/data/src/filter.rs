//! Typed filters for the raw `Predictoor` table.
//!
//! Dropdown selections arrive as strings; `""` and `"ALL"` both mean "no
//! constraint". Values are compared as typed data and never interpolated into
//! query text.

use crate::csv_storage::parse_bool_token;
use crate::error::{DataError, Result};
use crate::models::{columns, PredictionRecord};
use serde::Serialize;

/// Selector value meaning "do not filter".
pub const ALL: &str = "ALL";

/// A single dropdown selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection<T> {
    #[default]
    Any,
    Eq(T),
}

impl<T: PartialEq> Selection<T> {
    #[must_use]
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Self::Any => true,
            Self::Eq(expected) => expected == value,
        }
    }

    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

fn is_unconstrained(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.eq_ignore_ascii_case(ALL)
}

impl Selection<String> {
    /// Parses a text selector.
    #[must_use]
    pub fn parse_text(raw: &str) -> Self {
        if is_unconstrained(raw) {
            Self::Any
        } else {
            Self::Eq(raw.trim().to_string())
        }
    }
}

impl Selection<bool> {
    /// Parses a boolean selector.
    ///
    /// # Errors
    /// Returns `DataError::InvalidFilter` for anything but a boolean or `ALL`.
    pub fn parse_bool(column: &str, raw: &str) -> Result<Self> {
        if is_unconstrained(raw) {
            return Ok(Self::Any);
        }
        parse_bool_token(raw)
            .map(Self::Eq)
            .ok_or_else(|| DataError::InvalidFilter {
                column: column.to_string(),
                value: raw.to_string(),
            })
    }
}

/// Conjunction of per-column selections on the raw table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilter {
    pub trading_pair: Selection<String>,
    pub timeframe: Selection<String>,
    pub exchange: Selection<String>,
    pub predicted_value: Selection<bool>,
    pub true_value: Selection<bool>,
}

impl RawFilter {
    /// Builds a filter from optional selector strings keyed by column name.
    ///
    /// # Errors
    /// Returns `DataError::InvalidFilter` if a boolean selector is malformed.
    pub fn from_selectors(selectors: &RawSelectors) -> Result<Self> {
        let text = |raw: &Option<String>| raw.as_deref().map_or(Selection::Any, Selection::parse_text);
        let flag = |column: &str, raw: &Option<String>| {
            raw.as_deref()
                .map_or(Ok(Selection::Any), |r| Selection::parse_bool(column, r))
        };

        Ok(Self {
            trading_pair: text(&selectors.trading_pair),
            timeframe: text(&selectors.timeframe),
            exchange: text(&selectors.exchange),
            predicted_value: flag(columns::PREDICTED_VALUE, &selectors.predicted_value)?,
            true_value: flag(columns::TRUE_VALUE, &selectors.true_value)?,
        })
    }

    #[must_use]
    pub fn matches(&self, record: &PredictionRecord) -> bool {
        self.trading_pair.accepts(&record.trading_pair)
            && self.timeframe.accepts(&record.timeframe)
            && self.exchange_accepts(record.exchange.as_ref())
            && self.predicted_value.accepts(&record.predicted_value)
            && self.true_value.accepts(&record.true_value)
    }

    fn exchange_accepts(&self, exchange: Option<&String>) -> bool {
        match (&self.exchange, exchange) {
            (Selection::Any, _) => true,
            (Selection::Eq(expected), Some(actual)) => expected == actual,
            (Selection::Eq(_), None) => false,
        }
    }

    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.trading_pair.is_any()
            && self.timeframe.is_any()
            && self.exchange.is_any()
            && self.predicted_value.is_any()
            && self.true_value.is_any()
    }
}

/// Raw selector strings as they come from a form or query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct RawSelectors {
    #[serde(rename = "TradingPair")]
    pub trading_pair: Option<String>,
    #[serde(rename = "TimeFrame")]
    pub timeframe: Option<String>,
    #[serde(rename = "Exchange")]
    pub exchange: Option<String>,
    #[serde(rename = "PredictedValue")]
    pub predicted_value: Option<String>,
    #[serde(rename = "TrueValue")]
    pub true_value: Option<String>,
}

/// Dropdown definition for one filterable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub column: String,
    pub choices: Vec<String>,
}

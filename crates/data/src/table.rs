//! Generic tabular results returned by the catalog.
//!
//! Every view, static or date-filtered, is materialized as a [`Table`] so the
//! dashboard, the terminal formatter and the CSV exporter share one shape.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(u64),
    Decimal(Decimal),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Numeric view of the cell, used for charting.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Decimal(v) => v.to_f64(),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the cell with `precision` digits for fractional numbers.
    #[must_use]
    pub fn display(&self, precision: usize) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Decimal(v) => format!("{:.*}", precision, v),
            Self::Float(v) => format!("{:.*}", precision, v),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_u64(*v),
            Self::Decimal(v) => match v.to_f64() {
                Some(f) => serializer.serialize_f64(f),
                None => serializer.serialize_str(&v.to_string()),
            },
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Text(_) | Self::Date(_) | Self::DateTime(_) => {
                serializer.serialize_str(&self.to_string())
            }
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Null, Self::Float)
    }
}

impl From<Option<Decimal>> for Value {
    fn from(v: Option<Decimal>) -> Self {
        v.map_or(Self::Null, Self::Decimal)
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        v.map_or(Self::Null, Self::Text)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Boolean,
    Bigint,
    Decimal,
    Double,
    Varchar,
    Date,
    Timestamp,
}

impl DataType {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Bigint | Self::Decimal | Self::Double)
    }
}

/// Name and type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnInfo {
    #[must_use]
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
        }
    }
}

/// A named, materialized result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    #[must_use]
    pub fn new(name: &str, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must have one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Indices of numeric columns, skipping the first (label) column.
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| c.data_type.is_numeric())
            .map(|(i, _)| i)
            .collect()
    }

    /// Bar chart of every numeric column keyed by the first column.
    ///
    /// Returns `None` when the table has no numeric columns.
    #[must_use]
    pub fn bar_chart(&self) -> Option<BarChart> {
        let numeric = self.numeric_columns();
        if numeric.is_empty() || self.columns.is_empty() {
            return None;
        }

        let labels = self.rows.iter().map(|row| label_for(&row[0])).collect();
        let series = numeric
            .into_iter()
            .map(|idx| ChartSeries {
                name: self.columns[idx].name.clone(),
                values: self.rows.iter().map(|row| row[idx].as_f64()).collect(),
            })
            .collect();

        Some(BarChart { labels, series })
    }
}

fn label_for(value: &Value) -> String {
    if value.is_null() {
        "NULL".to_string()
    } else {
        value.to_string()
    }
}

/// Chart payload: one label per row, one series per numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    /// `None` renders as a gap.
    pub values: Vec<Option<f64>>,
}

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use predictoor_data::{
    BarChart, ColumnInfo, DataError, DateRange, FilterOption, RawFilter, RawSelectors, Table,
    TableQuery, PREDICTIONS_TABLE,
};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize)]
pub struct TableListResponse {
    pub tables: Vec<String>,
}

/// Date pickers of the dashboard sidebar. Missing or blank dates default to today.
#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end: Option<NaiveDate>,
}

/// A cleared date input submits `start=`; treat that like an absent field.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl DateParams {
    fn range(&self, today: NaiveDate) -> DateRange {
        DateRange::new(self.start.unwrap_or(today), self.end.unwrap_or(today))
    }
}

#[derive(Serialize)]
pub struct TableResponse {
    pub table: Table,
    /// Absent for the raw table and for tables without numeric columns.
    pub chart: Option<BarChart>,
    pub range: DateRange,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub records: usize,
    pub tables: Vec<String>,
}

/// Maps catalog errors onto HTTP status codes.
pub(crate) fn status_for(err: &DataError) -> StatusCode {
    match err {
        DataError::UnknownTable(_) | DataError::UnknownColumn { .. } => StatusCode::NOT_FOUND,
        DataError::InvalidFilter { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Lists all registered tables.
///
/// # Errors
/// This handler does not fail; the signature matches the other handlers.
pub async fn list_tables(
    State(state): State<AppState>,
) -> Result<Json<TableListResponse>, StatusCode> {
    let db = state.snapshot().await;
    Ok(Json(TableListResponse {
        tables: db.show_tables(),
    }))
}

/// Column names and types of a table.
///
/// # Errors
/// Returns `StatusCode::NOT_FOUND` if the table doesn't exist.
pub async fn table_columns(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ColumnInfo>>, StatusCode> {
    let db = state.snapshot().await;
    db.table_info(&name)
        .map(Json)
        .map_err(|e| status_for(&e))
}

/// Dropdown choices for filtering the raw table.
pub async fn filter_options(State(state): State<AppState>) -> Json<Vec<FilterOption>> {
    let db = state.snapshot().await;
    Json(db.filter_options())
}

/// Queries a table for the selected date range and raw-table filters.
///
/// # Errors
/// Returns `StatusCode::NOT_FOUND` if the table doesn't exist,
/// `StatusCode::BAD_REQUEST` for malformed filters, or
/// `StatusCode::INTERNAL_SERVER_ERROR` if aggregation fails.
pub async fn query_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(dates): Query<DateParams>,
    Query(selectors): Query<RawSelectors>,
) -> Result<Json<TableResponse>, StatusCode> {
    let filter = RawFilter::from_selectors(&selectors).map_err(|e| status_for(&e))?;
    let range = dates.range(Local::now().date_naive());

    let db = state.snapshot().await;
    let table = db
        .query(&TableQuery {
            table: name.clone(),
            range,
            filter,
        })
        .map_err(|e| {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!("Query on {} failed: {}", name, e);
            }
            status
        })?;

    let chart = if name == PREDICTIONS_TABLE {
        None
    } else {
        table.bar_chart()
    };

    Ok(Json(TableResponse {
        table,
        chart,
        range,
    }))
}

/// Re-reads the CSV export and rebuilds every table.
///
/// # Errors
/// Returns `StatusCode::INTERNAL_SERVER_ERROR` if the export cannot be loaded;
/// the previous data keeps being served.
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>, StatusCode> {
    let db = state.reload().await.map_err(|e| {
        tracing::error!("Reload failed: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ReloadResponse {
        records: db.len(),
        tables: db.show_tables(),
    }))
}

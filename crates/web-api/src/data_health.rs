//! Data health endpoint for the loaded export.
//!
//! Provides `/api/data/health`, reporting how many records are loaded, the
//! date span they cover, how stale the newest record is, and whether every
//! derived table was created.

use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{Local, NaiveDate, NaiveDateTime};
use predictoor_data::{PredictionDatabase, ACCURACY_TABLE, PROFIT_TABLE};
use serde::Serialize;

/// Tables that are expected after a successful startup.
const DERIVED_TABLES: [&str; 2] = [ACCURACY_TABLE, PROFIT_TABLE];

/// Overall data health response.
#[derive(Debug, Clone, Serialize)]
pub struct DataHealthResponse {
    /// "healthy", "degraded", or "unhealthy".
    pub status: String,
    /// Current server time.
    pub timestamp: NaiveDateTime,
    /// Number of loaded prediction records.
    pub records: usize,
    /// Earliest prediction date.
    pub first_date: Option<NaiveDate>,
    /// Latest prediction date.
    pub last_date: Option<NaiveDate>,
    /// Days between the latest prediction and today.
    pub staleness_days: Option<i64>,
    /// Registered tables.
    pub tables: Vec<String>,
    /// Derived tables that failed to build.
    pub missing_tables: Vec<String>,
}

/// Determine health status from record count and missing tables.
fn determine_status(records: usize, missing_tables: usize) -> String {
    if records == 0 {
        "unhealthy".to_string()
    } else if missing_tables > 0 {
        "degraded".to_string()
    } else {
        "healthy".to_string()
    }
}

fn build_health(db: &PredictionDatabase, now: NaiveDateTime) -> DataHealthResponse {
    let dates = db.records().iter().map(|r| r.date());
    let first_date = dates.clone().min();
    let last_date = dates.max();

    let missing_tables: Vec<String> = DERIVED_TABLES
        .iter()
        .filter(|t| !db.has_table(t))
        .map(|t| (*t).to_string())
        .collect();

    DataHealthResponse {
        status: determine_status(db.len(), missing_tables.len()),
        timestamp: now,
        records: db.len(),
        first_date,
        last_date,
        staleness_days: last_date.map(|d| (now.date() - d).num_days()),
        tables: db.show_tables(),
        missing_tables,
    }
}

/// GET /api/data/health - Returns health of the loaded data.
pub async fn data_health(State(state): State<AppState>) -> Json<DataHealthResponse> {
    let db = state.snapshot().await;
    let health = build_health(&db, Local::now().naive_local());
    if health.status != "healthy" {
        tracing::warn!(
            "Data health {}: {} records, missing tables {:?}",
            health.status,
            health.records,
            health.missing_tables
        );
    }
    Json(health)
}

#[cfg(test)]
mod tests {
    use super::*;
    use predictoor_data::PredictionRecord;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn record(day: u32, stake: Decimal) -> PredictionRecord {
        PredictionRecord {
            trading_pair: "BTC/USDT".to_string(),
            timeframe: "5min".to_string(),
            exchange: None,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            predicted_value: true,
            true_value: true,
            stake,
            payout: Decimal::ZERO,
        }
    }

    #[test]
    fn test_determine_status() {
        assert_eq!(determine_status(0, 0), "unhealthy");
        assert_eq!(determine_status(10, 1), "degraded");
        assert_eq!(determine_status(10, 0), "healthy");
    }

    #[test]
    fn test_health_span_and_staleness() {
        let db =
            PredictionDatabase::from_records(vec![record(3, dec!(1)), record(1, dec!(2))], Vec::new());
        let now = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let health = build_health(&db, now);

        assert_eq!(health.status, "healthy");
        assert_eq!(health.records, 2);
        assert_eq!(health.first_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(health.last_date, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert_eq!(health.staleness_days, Some(7));
        assert!(health.missing_tables.is_empty());
    }

    #[test]
    fn test_health_empty_database() {
        let db = PredictionDatabase::from_records(Vec::new(), Vec::new());
        let now = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let health = build_health(&db, now);
        assert_eq!(health.status, "unhealthy");
        assert_eq!(health.first_date, None);
        assert_eq!(health.staleness_days, None);
    }
}

use serde::{Deserialize, Serialize};

/// Timestamp layout used by Predictoor CSV exports (`MM/DD/YYYY HH:MM`).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub server: ServerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path of the Predictoor CSV export.
    pub csv_path: String,
    /// `chrono` format string for the `Timestamp` column.
    pub timestamp_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Timeframes that get an extra per-pair row in the accuracy view.
    pub pinned_timeframes: Vec<String>,
    /// Digits after the decimal point when printing tables.
    pub float_precision: usize,
}

impl ServerConfig {
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/predictoor.csv".to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            pinned_timeframes: vec!["1hr".to_string(), "5min".to_string()],
            float_precision: 3,
        }
    }
}

//! CLI commands for the Predictoor stats dashboard.

pub mod report;
pub mod serve;
pub mod tables;

pub use report::{run_report, ReportArgs};
pub use serve::{run_serve, ServeArgs};
pub use tables::{run_tables, TablesArgs};

use anyhow::{Context, Result};
use clap::Args;
use predictoor_core::{config_loader::DEFAULT_CONFIG_PATH, AppConfig, ConfigLoader};
use predictoor_data::{DatabaseOptions, PredictionDatabase};
use std::path::PathBuf;

/// Where configuration and data come from. Shared by every command.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Predictoor CSV export (overrides `data.csv_path`)
    #[arg(long, env = "PREDICTOOR_CSV")]
    pub csv: Option<PathBuf>,
}

impl SourceArgs {
    /// Loads the layered config and applies command-line overrides.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be parsed.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = ConfigLoader::load_from(&self.config)
            .with_context(|| format!("Failed to load config from {}", self.config))?;
        if let Some(csv) = &self.csv {
            config.data.csv_path = csv.display().to_string();
        }
        Ok(config)
    }
}

#[must_use]
pub fn database_options(config: &AppConfig) -> DatabaseOptions {
    DatabaseOptions {
        csv_path: PathBuf::from(&config.data.csv_path),
        timestamp_format: config.data.timestamp_format.clone(),
        pinned_timeframes: config.report.pinned_timeframes.clone(),
    }
}

/// Loads the CSV export into a fresh database.
///
/// # Errors
/// Returns an error if the export cannot be read or parsed.
pub fn open_database(options: &DatabaseOptions) -> Result<PredictionDatabase> {
    PredictionDatabase::load(options)
        .with_context(|| format!("Failed to load {}", options.csv_path.display()))
}

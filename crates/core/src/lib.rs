//! Shared configuration for the Predictoor stats workspace.

pub mod config;
pub mod config_loader;
pub mod file_watcher;

pub use config::{AppConfig, DataConfig, ReportConfig, ServerConfig, DEFAULT_TIMESTAMP_FORMAT};
pub use config_loader::ConfigLoader;
pub use file_watcher::FileWatcher;

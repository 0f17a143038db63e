use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

/// Default location of the TOML config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Prefix for environment overrides, e.g. `PREDICTOOR_DATA__CSV_PATH`.
pub const ENV_PREFIX: &str = "PREDICTOOR_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads application configuration from a specific TOML file.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed.
    pub fn load_from(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Self::figment(path).extract()?;
        tracing::debug!("Loaded configuration from {}: {:?}", path, config);
        Ok(config)
    }

    fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .join(Json::file("config/Config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("config/missing.toml").unwrap();
            assert_eq!(config.data.csv_path, "data/predictoor.csv");
            assert_eq!(config.server.port, 8501);
            Ok(())
        });
    }

    #[test]
    fn test_toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [data]
                csv_path = "exports/predictoor.csv"

                [report]
                pinned_timeframes = []
                "#,
            )?;
            let config = ConfigLoader::load_from("Config.toml").unwrap();
            assert_eq!(config.data.csv_path, "exports/predictoor.csv");
            assert_eq!(config.data.timestamp_format, "%m/%d/%Y %H:%M");
            assert!(config.report.pinned_timeframes.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml() {
        Jail::expect_with(|jail| {
            jail.create_file("Config.toml", "[server]\nport = 9000\n")?;
            jail.set_env("PREDICTOOR_SERVER__PORT", "9100");
            jail.set_env("PREDICTOOR_DATA__CSV_PATH", "/tmp/p.csv");
            let config = ConfigLoader::load_from("Config.toml").unwrap();
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.data.csv_path, "/tmp/p.csv");
            Ok(())
        });
    }
}

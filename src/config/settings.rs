use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when no path is given
pub const DEFAULT_SETTINGS_FILE: &str = "ames-api";

/// Prefix for environment overrides, e.g. `AMES_API_PORT=9000`
pub const ENV_PREFIX: &str = "AMES_API";

/// Service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Exported estimator pipeline
    pub model_path: PathBuf,
    /// Frozen list of engineered column names
    pub columns_path: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            model_path: PathBuf::from("artifacts/ames_ridge_model.json"),
            columns_path: PathBuf::from("artifacts/expected_columns.json"),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Layer defaults, the settings file, then `AMES_API_*` environment variables.
    ///
    /// An explicit `path` must exist; the default `ames-api.{toml,json,yaml}` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Settings::default();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let config = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("model_path", defaults.model_path.to_string_lossy().to_string())?
            .set_default("columns_path", defaults.columns_path.to_string_lossy().to_string())?
            .set_default("log_level", defaults.log_level)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to assemble service settings")?;

        config
            .try_deserialize()
            .context("Failed to deserialize service settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_settings_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 9100\nmodel_path = \"/srv/model.json\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.port, 9100);
        assert_eq!(settings.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.columns_path, Settings::default().columns_path);
    }

    #[test]
    fn test_explicit_settings_file_must_exist() {
        let missing = std::env::temp_dir().join("ames-api-does-not-exist.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }
}

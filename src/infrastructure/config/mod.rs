use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::{debug, info};

use crate::domain::config::AppConfig;
use crate::domain::error::{AppError, Result};

/// Environment variable prefix, e.g. `BEAVER_DECODER__DELIMITER=";"`
pub const ENV_PREFIX: &str = "BEAVER_";

/// Loads [`AppConfig`] from defaults, an optional TOML file and the environment
pub struct ConfigService {
    file: Option<PathBuf>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self { file: None }
    }

    /// Merge a TOML file over the defaults; a missing file is skipped
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = &self.file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(&self) -> Result<AppConfig> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }

        let config: AppConfig = self
            .figment()
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;

        info!(
            delimiter = ?config.decoder.delimiter,
            width_policy = ?config.decoder.width_policy,
            dismiss_after_ms = config.alert.dismiss_after_ms,
            "Configuration loaded"
        );
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

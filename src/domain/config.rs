use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::csv::DecoderConfig;

/// Alert timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Delay before a terminal lifecycle state hides the alert (default: 1000)
    pub dismiss_after_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: 1000,
        }
    }
}

impl AlertConfig {
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.dismiss_after_ms == 0 {
            return Err("dismiss_after_ms must be > 0".to_string());
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub decoder: DecoderConfig,
    pub alert: AlertConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.decoder.validate()?;
        self.alert.validate()
    }
}

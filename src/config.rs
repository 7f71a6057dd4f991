//! Front-end configuration.
//!
//! The browser passes a JSON object; the native tool reads TOML (behind the
//! `toml-config` feature). Every field has a default, so an empty document is
//! a valid configuration.

use serde::{Deserialize, Serialize};

use crate::diagram::feature_layer_keys;
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str =
    "https://mnist-cnn-torchscript-inference-api-production.up.railway.app";
pub const DEFAULT_PREDICT_PATH: &str = "/predict";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_AUTOPREDICT_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Base URL of the classification service.
    pub api_url: String,
    pub predict_path: String,
    /// `None` waits for the service indefinitely.
    pub request_timeout_ms: Option<u64>,
    /// Delay between loading the preset and the first prediction.
    pub autopredict_delay_ms: u64,
    /// Names for response layers 1, 2, 3, ...
    pub layer_names: Vec<String>,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            predict_path: DEFAULT_PREDICT_PATH.to_string(),
            request_timeout_ms: Some(DEFAULT_TIMEOUT_MS),
            autopredict_delay_ms: DEFAULT_AUTOPREDICT_DELAY_MS,
            layer_names: feature_layer_keys().iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl SketchConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Full URL the prediction request is posted to.
    pub fn predict_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        if self.predict_path.starts_with('/') {
            format!("{}{}", base, self.predict_path)
        } else {
            format!("{}/{}", base, self.predict_path)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("api_url is empty".into()));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "api_url must be http(s): {}",
                self.api_url
            )));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue(
                "request_timeout_ms must be positive (omit it to wait forever)".into(),
            ));
        }
        if let Some(i) = self.layer_names.iter().position(|n| n.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(format!(
                "layer_names[{}] is empty",
                i
            )));
        }
        Ok(())
    }
}

//! Configuration module for cortical.
//!
//! Holds the client configuration types and the YAML file layer used by the
//! command-line front end. The library itself only needs [`ClientConfig`].

mod client;
mod logging;

pub use client::{
    ClientConfig, ClientOptions, DEFAULT_CLIENT, DEFAULT_LANGUAGE, DEFAULT_RETINA, DEFAULT_URL,
};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CorticalError;

/// Environment variable holding the configuration file path.
pub const ENV_CONFIG_PATH: &str = "CORTICAL_CONFIG";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "CORTICAL_API_KEY";

/// File configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client overrides.
    pub client: ClientOptions,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from an optional path.
    /// If path is None, uses default search paths.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, CorticalError> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => {
                let default_paths = [
                    "/etc/cortical/config.yaml",
                    "cortical.yaml",
                    "cortical.yml",
                ];

                match default_paths
                    .iter()
                    .find(|path| std::path::Path::new(path).exists())
                {
                    Some(path) => Self::load_from_path(path)?,
                    None => Self::default(),
                }
            }
        };

        config.apply_env(std::env::var(ENV_API_KEY).ok());
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, CorticalError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CorticalError::config_with_source(
                format!("Failed to read config file '{}'", path.as_ref().display()),
                e,
            )
        })?;

        Self::load_from_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn load_from_str(content: &str) -> Result<Self, CorticalError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| CorticalError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Fills the API key from the environment when the file has none.
    fn apply_env(&mut self, api_key: Option<String>) {
        if self.client.key.is_none() {
            self.client.key = api_key.filter(|k| !k.is_empty());
        }
    }

    /// Validates configuration.
    fn validate(&self) -> Result<(), CorticalError> {
        let named = [
            ("client.retina", &self.client.retina),
            ("client.language", &self.client.language),
            ("client.client", &self.client.client),
        ];

        for (name, value) in named {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(CorticalError::config(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }

    /// Resolves the client configuration, with `overrides` taking precedence.
    pub fn client_config(&self, overrides: ClientOptions) -> ClientConfig {
        ClientConfig::from_options(self.client.clone().merge(overrides))
    }
}

//! Layered configuration
//!
//! Sources, later ones winning: built-in defaults, `config/default`,
//! `config/{ENVIRONMENT}`, `config/local`, then `OICP__SECTION__KEY`
//! environment variables.

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::{env, path::Path, time::Duration};

use crate::domain::DerivedIdLength;

pub const ENV_PREFIX: &str = "OICP";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    pub request_timeout_ms: u64,
    pub derived_id_length: usize,
    #[serde(default)]
    pub default_operator_name: Option<String>,
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Clamped into the supported hash length range
    pub fn derived_id_length(&self) -> DerivedIdLength {
        DerivedIdLength::new(self.derived_id_length)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
    Pretty,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with one configuration file; no environment lookup
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("client.request_timeout_ms", 60_000)?
        .set_default("client.derived_id_length", 20)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "full")
}

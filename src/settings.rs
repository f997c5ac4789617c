//! Layered settings: built in defaults, then an optional file, then
//! `TYPED_OPTIONAL__SECTION__KEY` environment variables.

use std::path::Path;

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::Deserialize;

use crate::error::{OptionalError, Result};

/// Looked up in the working directory, any format `config` understands.
pub const DEFAULT_CONFIG_FILE: &str = "typed-optional";
pub const ENV_PREFIX: &str = "TYPED_OPTIONAL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub delimiter: char,
    pub wildcard: String,
}
impl Default for PathSettings {
    fn default() -> Self {
        Self {
            delimiter: '.',
            wildcard: String::from("*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub filter: String,
}
impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: String::from("warn"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub path: PathSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Reads `file` when given (it must exist), otherwise the default file if present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let builder = Config::builder();
        let builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        Self::finish(builder)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        Self::finish(Config::builder().add_source(File::from_str(source, FileFormat::Toml)))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        let path = &self.path;
        if path.wildcard.is_empty() {
            return Err(OptionalError::Config("path.wildcard cannot be empty".into()));
        }
        if path.wildcard.contains(path.delimiter) {
            return Err(OptionalError::Config(format!(
                "path.wildcard {:?} cannot contain the delimiter {:?}",
                path.wildcard, path.delimiter
            )));
        }
        Ok(())
    }
}

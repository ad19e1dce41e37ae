use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pgoutput::ProtocolOptions;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub protocol: ProtocolOptions,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub pretty: bool,
    #[serde(default = "default_include_keepalives")]
    pub include_keepalives: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: false,
            include_keepalives: default_include_keepalives(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl Config {
    /// Loads a TOML file, then applies `PGOUTPUT_` environment overrides
    /// (`PGOUTPUT_PROTOCOL__STREAMING=parallel`).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PGOUTPUT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.pretty && self.output.format != OutputFormat::Json {
            return Err(Error::Config(
                "output.pretty only applies to the json format".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_include_keepalives() -> bool {
    true
}

use crate::{
    conf::{DatasetConfig, SourceConfig, TargetConfig},
    core::BenchError::{self, ConfigParsingError},
};
use config::{Config as CConfig, Environment};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "TRIPBENCH";

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

impl Config {
    pub fn from_str(toml_str: &str) -> Result<Config, BenchError> {
        let config = CConfig::builder()
            .add_source(config::File::from_str(toml_str, config::FileFormat::Toml))
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))?;
        return Ok(config);
    }

    /// Loads defaults, then the optional TOML file, then `TRIPBENCH_*`
    /// environment overrides (`TRIPBENCH_TARGET__MONGO_URI` and so on).
    pub fn load(path: Option<&str>) -> Result<Config, BenchError> {
        Self::load_with_env(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(path: Option<&str>, env: Environment) -> Result<Config, BenchError> {
        let mut builder = CConfig::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(Path::new(path)).format(config::FileFormat::Toml),
            );
        }
        let config = builder
            .add_source(env)
            .build()
            .map_err(|e| ConfigParsingError(e.to_string()))?
            .try_deserialize::<Config>()
            .map_err(|e| ConfigParsingError(e.to_string()))?;
        Ok(config)
    }
}

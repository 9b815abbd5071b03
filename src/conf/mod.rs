mod config;
mod dataset;
mod source;
mod target;

pub use config::{Config, ENV_PREFIX};
pub use dataset::DatasetConfig;
pub use source::{LocalSourceConfig, S3SourceConfig, SourceConfig};
pub use target::TargetConfig;

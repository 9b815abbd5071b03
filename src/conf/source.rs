use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct S3SourceConfig {
    #[serde(default = "S3SourceConfig::default_bucket")]
    pub bucket: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "S3SourceConfig::default_region")]
    pub region: String,
    /// Send signed requests using credentials from the environment.
    #[serde(default)]
    pub signed: bool,
}

impl S3SourceConfig {
    pub fn default_bucket() -> String {
        String::from("tripdata")
    }

    pub fn default_region() -> String {
        String::from("us-east-1")
    }
}

impl Default for S3SourceConfig {
    fn default() -> Self {
        Self {
            bucket: Self::default_bucket(),
            prefix: String::new(),
            endpoint: None,
            region: Self::default_region(),
            signed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LocalSourceConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub enum SourceConfig {
    #[serde(rename = "s3")]
    S3(S3SourceConfig),
    #[serde(rename = "local")]
    Local(LocalSourceConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::S3(S3SourceConfig::default())
    }
}

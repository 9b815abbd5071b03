use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the benchmark writes: the two endpoints and the shared namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    #[serde(default = "TargetConfig::default_mongo_uri")]
    pub mongo_uri: String,
    #[serde(default = "TargetConfig::default_docdb_uri")]
    pub docdb_uri: String,
    #[serde(default = "TargetConfig::default_database_name")]
    pub database_name: String,
    #[serde(default = "TargetConfig::default_collection_name")]
    pub collection_name: String,
    #[serde(default, with = "humantime_serde")]
    pub server_selection_timeout: Option<Duration>,
    #[serde(default)]
    pub app_name: Option<String>,
    /// Optional cap on update statements per command. The endpoint's own
    /// `maxWriteBatchSize` and `maxBsonObjectSize` always apply.
    #[serde(default)]
    pub upsert_batch_size: Option<usize>,
}

impl TargetConfig {
    fn default_mongo_uri() -> String {
        String::from("mongodb://localhost:27017")
    }

    fn default_docdb_uri() -> String {
        String::from("mongodb://localhost:27018")
    }

    fn default_database_name() -> String {
        String::from("tripbench")
    }

    fn default_collection_name() -> String {
        String::from("loadtest")
    }

    /// Endpoint labels paired with their connection strings, in run order.
    pub fn endpoints(&self) -> [(&'static str, &str); 2] {
        [("MongoDB", &self.mongo_uri), ("DocDB", &self.docdb_uri)]
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            mongo_uri: Self::default_mongo_uri(),
            docdb_uri: Self::default_docdb_uri(),
            database_name: Self::default_database_name(),
            collection_name: Self::default_collection_name(),
            server_selection_timeout: None,
            app_name: None,
            upsert_batch_size: None,
        }
    }
}

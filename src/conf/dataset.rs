use serde::{Deserialize, Serialize};

use crate::source::ArchivePartition;

/// Which archive partitions to read and how rows are keyed and sampled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    #[serde(default = "DatasetConfig::default_start")]
    pub start: ArchivePartition,
    #[serde(default = "DatasetConfig::default_end")]
    pub end: ArchivePartition,
    #[serde(default = "DatasetConfig::default_key_template")]
    pub key_template: String,
    #[serde(default = "DatasetConfig::default_key_field")]
    pub key_field: String,
    #[serde(default = "DatasetConfig::default_seed")]
    pub seed: u64,
}

impl DatasetConfig {
    fn default_start() -> ArchivePartition {
        ArchivePartition::new(2017, 1)
    }

    fn default_end() -> ArchivePartition {
        ArchivePartition::new(2023, 12)
    }

    fn default_key_template() -> String {
        String::from("{year}{month}-citibike-tripdata.csv.zip")
    }

    fn default_key_field() -> String {
        String::from("Bike ID")
    }

    fn default_seed() -> u64 {
        1
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            start: Self::default_start(),
            end: Self::default_end(),
            key_template: Self::default_key_template(),
            key_field: Self::default_key_field(),
            seed: Self::default_seed(),
        }
    }
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use tripbench::conf::{Config, DatasetConfig, LocalSourceConfig, SourceConfig};
use tripbench::core::{BenchError, SampleRecord};
use tripbench::source::{ArchivePartition, ArchiveSource, partition_range};
use tripbench::testutil::{generate_records, write_zip_partition};

pub const TEMPLATE: &str = "{year}{month}-citibike-tripdata.csv.zip";

/// Lays out `rows_per_partition` zipped rows for every month in `start..=end`.
pub fn setup_local_archive(
    start: ArchivePartition,
    end: ArchivePartition,
    rows_per_partition: usize,
) -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    for partition in partition_range(start, end).unwrap() {
        write_zip_partition(dir.path(), &partition, TEMPLATE, rows_per_partition).unwrap();
    }
    let config = Config {
        dataset: DatasetConfig {
            start,
            end,
            key_template: TEMPLATE.to_string(),
            ..DatasetConfig::default()
        },
        source: SourceConfig::Local(LocalSourceConfig {
            path: dir.path().to_str().unwrap().to_string(),
        }),
        ..Config::default()
    };
    (dir, config)
}

pub fn dataset(start: ArchivePartition, end: ArchivePartition) -> DatasetConfig {
    DatasetConfig {
        start,
        end,
        ..DatasetConfig::default()
    }
}

/// Serves generated rows from memory and records every fetch.
pub struct MemoryArchive {
    partitions: HashMap<ArchivePartition, Vec<SampleRecord>>,
    fail_on: Option<ArchivePartition>,
    pub fetched: Mutex<Vec<ArchivePartition>>,
}

impl MemoryArchive {
    /// Every partition in range gets `rows` rows with globally unique `row` values.
    pub fn new(start: ArchivePartition, end: ArchivePartition, rows: usize) -> Self {
        let all = partition_range(start, end).unwrap();
        let records = generate_records(all.len() * rows);
        let mut partitions = HashMap::new();
        for (i, partition) in all.into_iter().enumerate() {
            partitions.insert(partition, records[i * rows..(i + 1) * rows].to_vec());
        }
        Self {
            partitions,
            fail_on: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, partition: ArchivePartition) -> Self {
        self.fail_on = Some(partition);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl ArchiveSource for MemoryArchive {
    async fn fetch(&self, partition: &ArchivePartition) -> Result<Vec<SampleRecord>, BenchError> {
        self.fetched.lock().unwrap().push(*partition);
        if self.fail_on == Some(*partition) {
            return Err(BenchError::AcquisitionFailure(format!(
                "fetching '{}': 403 Forbidden",
                partition
            )));
        }
        Ok(self.partitions.get(partition).cloned().unwrap_or_default())
    }
}

use log::{debug, info};

use crate::bench::BenchOptions;
use crate::conf::DatasetConfig;
use crate::core::BenchError;

use super::archive::ArchiveSource;
use super::partition::partition_range;
use super::sample::{SampleBatch, SamplePool};

/// Output of the acquisition stage.
#[derive(Debug)]
pub struct Acquired {
    /// The seeded initial batch.
    pub batch: SampleBatch,
    /// Retained only when trials need to resample; dropped in truncate mode.
    pub pool: Option<SamplePool>,
}

pub type AcquisitionResult = Result<Acquired, BenchError>;

/// Fetches partitions oldest first until the pool holds more than
/// `opts.num_docs` rows, then draws the initial batch with the dataset seed.
pub async fn acquire<S: ArchiveSource + ?Sized>(
    source: &S,
    dataset: &DatasetConfig,
    opts: &BenchOptions,
) -> AcquisitionResult {
    let n = opts.num_docs;
    if n < 1 {
        return Err(BenchError::InvalidConfiguration(
            "Number of documents must be positive".to_string(),
        ));
    }
    let partitions = partition_range(dataset.start, dataset.end)?;

    info!("Loading data...Please wait");

    let mut pool = SamplePool::new();
    let mut key_checked = !opts.mode.needs_key();

    for partition in &partitions {
        let records = source.fetch(partition).await?;

        if !key_checked {
            if let Some(first) = records.first() {
                if first.get(&dataset.key_field).is_none() {
                    return Err(BenchError::InvalidConfiguration(format!(
                        "key field '{}' not present in partition {}",
                        dataset.key_field, partition
                    )));
                }
                key_checked = true;
            }
        }

        debug!(
            "Partition {}: {} rows, pool now {}",
            partition,
            records.len(),
            pool.len() + records.len()
        );
        pool.extend(records);

        if pool.len() > n {
            break;
        }
    }

    if pool.len() < n {
        return Err(BenchError::AcquisitionFailure(format!(
            "archive range {}..{} holds only {} rows, {} requested",
            dataset.start,
            dataset.end,
            pool.len(),
            n
        )));
    }

    let batch = pool.draw_seeded(n, dataset.seed)?;
    let pool = if opts.truncate { None } else { Some(pool) };

    info!("Data loaded into memory successfully");
    Ok(Acquired { batch, pool })
}

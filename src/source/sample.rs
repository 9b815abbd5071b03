use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::core::{BenchError, SampleRecord};

/// Every row accumulated from the archive, in fetch order.
#[derive(Debug, Clone, Default)]
pub struct SamplePool {
    records: Vec<SampleRecord>,
}

impl SamplePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = SampleRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// Draws `n` distinct rows uniformly at random.
    pub fn draw<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<SampleBatch, BenchError> {
        if n > self.records.len() {
            return Err(BenchError::AcquisitionFailure(format!(
                "cannot sample {} rows from a pool of {}",
                n,
                self.records.len()
            )));
        }
        let records = index::sample(rng, self.records.len(), n)
            .into_iter()
            .map(|i| self.records[i].clone())
            .collect();
        Ok(SampleBatch { records })
    }

    /// Reproducible draw: the same pool, size and seed give the same batch.
    pub fn draw_seeded(&self, n: usize, seed: u64) -> Result<SampleBatch, BenchError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.draw(n, &mut rng)
    }
}

impl From<Vec<SampleRecord>> for SamplePool {
    fn from(records: Vec<SampleRecord>) -> Self {
        Self { records }
    }
}

/// The rows written by one trial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBatch {
    records: Vec<SampleRecord>,
}

impl SampleBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SampleRecord> {
        self.records.iter()
    }
}

impl From<Vec<SampleRecord>> for SampleBatch {
    fn from(records: Vec<SampleRecord>) -> Self {
        Self { records }
    }
}

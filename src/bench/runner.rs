use std::time::Instant;

use log::{debug, error, info, warn};

use crate::core::BenchError;
use crate::source::{Acquired, SampleBatch, SamplePool};

use super::options::BenchOptions;
use super::report::{EndpointOutcome, EndpointReport, RunSummary, TrialResult};
use super::target::{WritePayload, WriteTarget};

pub type WriteResult = Result<TrialResult, BenchError>;

/// Drives timed bulk-write trials against a sequence of endpoints.
pub struct Runner<'a> {
    opts: &'a BenchOptions,
    key_field: &'a str,
}

impl<'a> Runner<'a> {
    pub fn new(opts: &'a BenchOptions, key_field: &'a str) -> Self {
        Self { opts, key_field }
    }

    /// Times a single bulk write. Payload conversion happens before the clock starts.
    pub async fn run_trial<T: WriteTarget + ?Sized>(
        &self,
        target: &mut T,
        batch: &SampleBatch,
    ) -> WriteResult {
        let payload = WritePayload::build(target.name(), batch, self.opts.mode, self.key_field)?;

        let start = Instant::now();
        target.write(payload).await?;
        Ok(TrialResult::new(start.elapsed()))
    }

    /// Runs every trial for one endpoint, then drops its collection and
    /// closes it. Cleanup runs even when a trial fails.
    pub async fn run_endpoint<T: WriteTarget + ?Sized>(
        &self,
        target: &mut T,
        batch: &mut SampleBatch,
        pool: Option<&SamplePool>,
    ) -> Result<EndpointReport, BenchError> {
        let result = self.run_trials(target, batch, pool).await;

        if let Err(e) = target.cleanup().await {
            warn!("{}: cleanup failed: {}", target.name(), e);
        }
        if let Err(e) = target.close().await {
            warn!("{}: close failed: {}", target.name(), e);
        }
        result
    }

    async fn run_trials<T: WriteTarget + ?Sized>(
        &self,
        target: &mut T,
        batch: &mut SampleBatch,
        pool: Option<&SamplePool>,
    ) -> Result<EndpointReport, BenchError> {
        if self.opts.truncate {
            target.truncate().await?;
        }

        let mut trials = Vec::with_capacity(self.opts.iter);
        for i in 0..self.opts.iter {
            let trial = self.run_trial(target, batch).await?;
            debug!(
                "{}: trial {}/{} wrote {} documents in {:.6}s",
                target.name(),
                i + 1,
                self.opts.iter,
                batch.len(),
                trial.secs()
            );
            trials.push(trial);

            if self.opts.truncate {
                target.truncate().await?;
            } else {
                *batch = self.resample(target.name(), pool)?;
            }
        }

        EndpointReport::new(target.name(), self.opts.num_docs, trials)
    }

    fn resample(&self, endpoint: &str, pool: Option<&SamplePool>) -> Result<SampleBatch, BenchError> {
        let pool = pool.ok_or_else(|| BenchError::WriteFailure {
            endpoint: endpoint.to_string(),
            reason: "sample pool was discarded, cannot resample".to_string(),
        })?;
        pool.draw(self.opts.num_docs, &mut rand::thread_rng())
    }

    /// Benchmarks each target in order. A failing endpoint is logged and
    /// recorded; the remaining endpoints still run.
    pub async fn run_all<T: WriteTarget>(&self, targets: Vec<T>, acquired: Acquired) -> RunSummary {
        let Acquired { mut batch, pool } = acquired;
        let mut summary = RunSummary::default();

        for mut target in targets {
            let name = target.name().to_string();
            let result = self
                .run_endpoint(&mut target, &mut batch, pool.as_ref())
                .await;
            match &result {
                Ok(report) => info!("{}", report),
                Err(e) => error!("Write operations failed: {}", e),
            }
            summary.outcomes.push(EndpointOutcome { name, result });
        }
        summary
    }
}

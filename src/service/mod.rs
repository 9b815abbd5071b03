use log::info;

use crate::bench::{BenchOptions, RunSummary, Runner};
use crate::conf::Config;
use crate::core::BenchError;
use crate::endpoint::{Connector, MongoConnector, register_endpoints};
use crate::source::{ArchiveSource, ObjectStoreArchive, acquire};

/// One benchmark run: acquisition, endpoint registration, then the trials.
pub struct BenchService {
    config: Config,
    opts: BenchOptions,
}

impl BenchService {
    /// Rejects invalid options before anything touches the network.
    pub fn new(config: Config, opts: BenchOptions) -> Result<Self, BenchError> {
        opts.validate()?;
        Ok(Self { config, opts })
    }

    /// Runs every stage against the given archive and endpoints.
    ///
    /// Acquisition and registration failures are returned as errors. Write
    /// failures are scoped to their endpoint and reported in the summary.
    pub async fn run<S, C>(&self, source: &S, connector: &C) -> Result<RunSummary, BenchError>
    where
        S: ArchiveSource + ?Sized,
        C: Connector,
    {
        let acquired = acquire(source, &self.config.dataset, &self.opts).await?;
        let targets = register_endpoints(connector, &self.config.target).await?;

        info!("Starting write operations...");
        let runner = Runner::new(&self.opts, &self.config.dataset.key_field);
        let summary = runner.run_all(targets, acquired).await;

        if summary.is_success() {
            info!("Write operations completed successfully");
        }
        Ok(summary)
    }

    /// Runs against the configured archive and real MongoDB-compatible servers.
    pub async fn run_default(&self) -> Result<RunSummary, BenchError> {
        let source =
            ObjectStoreArchive::new(&self.config.source, &self.config.dataset.key_template)?;
        self.run(&source, &MongoConnector).await
    }
}

mod options;
mod report;
mod runner;
mod target;

pub use options::{BenchOptions, WriteMode};
pub use report::{
    EndpointOutcome, EndpointReport, RunSummary, TrialResult, insertion_rate, mean_elapsed,
};
pub use runner::{Runner, WriteResult};
pub use target::{Upsert, WritePayload, WriteTarget};

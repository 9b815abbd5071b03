mod args;
mod error;
mod exit;
mod logger;
mod record;

pub use args::CliArgs;
pub use error::BenchError;
pub use exit::{EXIT_FAILURE, EXIT_SUCCESS, EXIT_WRITE_FAILURE, usage_exit_status};
pub use logger::setup_logging;
pub use record::{FieldValue, SampleRecord};

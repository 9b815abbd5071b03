use clap::Parser;
use log::kv::{ToValue, Value};

use crate::bench::{BenchOptions, WriteMode};
use crate::core::BenchError;

/// Write throughput benchmark for MongoDB-compatible endpoints.
#[derive(Parser, Debug, PartialEq)]
#[command(version, about)]
pub struct CliArgs {
    /// Path to a TOML config file.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of documents to insert per trial.
    #[arg(long = "num_docs", default_value_t = 1000, allow_negative_numbers = true)]
    pub num_docs: i64,

    /// Number of timed trials per endpoint.
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    pub iter: i64,

    /// Drop the collection after every trial instead of resampling.
    #[arg(long)]
    pub truncate: bool,

    /// Upsert by the record key instead of inserting unconditionally.
    #[arg(long = "specify-id")]
    pub specify_id: bool,
}

impl CliArgs {
    /// Validates the numeric flags and turns them into run options.
    ///
    /// Runs before any config is loaded or network access is attempted.
    pub fn options(&self) -> Result<BenchOptions, BenchError> {
        if self.num_docs < 1 {
            return Err(BenchError::InvalidConfiguration(
                "Number of documents must be positive".to_string(),
            ));
        }
        if self.iter < 1 {
            return Err(BenchError::InvalidConfiguration(
                "Number of iterations must be positive".to_string(),
            ));
        }
        Ok(BenchOptions {
            num_docs: self.num_docs as usize,
            iter: self.iter as usize,
            truncate: self.truncate,
            mode: if self.specify_id {
                WriteMode::Upsert
            } else {
                WriteMode::Insert
            },
        })
    }
}

impl ToValue for CliArgs {
    fn to_value(&self) -> Value<'_> {
        Value::from_debug(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = CliArgs::parse_from(["self"]);
        assert_eq!(
            args,
            CliArgs {
                config: None,
                num_docs: 1000,
                iter: 3,
                truncate: false,
                specify_id: false,
            }
        );
    }

    #[test]
    fn test_args_parsing() {
        let args = CliArgs::parse_from([
            "self",
            "--config",
            "foo",
            "--num_docs",
            "200",
            "--iter",
            "5",
            "--truncate",
            "--specify-id",
        ]);
        assert_eq!(
            args,
            CliArgs {
                config: Some("foo".to_string()),
                num_docs: 200,
                iter: 5,
                truncate: true,
                specify_id: true,
            }
        );
    }

    #[test]
    fn test_options_from_args() {
        let args = CliArgs::parse_from(["self", "--num_docs", "500", "--specify-id"]);
        let opts = args.options().unwrap();
        assert_eq!(opts.num_docs, 500);
        assert_eq!(opts.iter, 3);
        assert!(!opts.truncate);
        assert_eq!(opts.mode, WriteMode::Upsert);
    }

    #[test]
    fn test_zero_docs_rejected() {
        let args = CliArgs::parse_from(["self", "--num_docs", "0"]);
        assert!(matches!(
            args.options(),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_negative_values_rejected() {
        let args = CliArgs::parse_from(["self", "--num_docs", "-3"]);
        assert!(args.options().is_err());

        let args = CliArgs::parse_from(["self", "--iter", "0"]);
        assert!(matches!(
            args.options(),
            Err(BenchError::InvalidConfiguration(_))
        ));
    }
}

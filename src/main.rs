use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use tripbench::bench::RunSummary;
use tripbench::conf::Config;
use tripbench::core::{CliArgs, EXIT_FAILURE, setup_logging, usage_exit_status};
use tripbench::service::BenchService;

async fn run(args: &CliArgs) -> anyhow::Result<RunSummary> {
    let opts = args.options()?;
    let config = Config::load(args.config.as_deref()).context("loading configuration")?;
    let service = BenchService::new(config, opts)?;
    Ok(service.run_default().await?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logging();
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(usage_exit_status(&err));
        }
    };
    info!(args = args; "tripbench started.");

    match run(&args).await {
        Ok(summary) => {
            if !summary.is_success() {
                let failed: Vec<&str> = summary.failures().map(|(name, _)| name).collect();
                error!("Write operations incomplete for: {}", failed.join(", "));
            }
            ExitCode::from(summary.exit_status())
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

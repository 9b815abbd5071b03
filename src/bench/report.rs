use std::fmt;
use std::time::Duration;

use crate::core::{BenchError, EXIT_SUCCESS, EXIT_WRITE_FAILURE};

/// Wall-clock time of one bulk-write trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialResult {
    pub elapsed: Duration,
}

impl TrialResult {
    pub fn new(elapsed: Duration) -> Self {
        Self { elapsed }
    }

    pub fn secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Arithmetic mean of the trial durations, in seconds.
pub fn mean_elapsed(trials: &[TrialResult]) -> Result<f64, BenchError> {
    if trials.is_empty() {
        return Err(BenchError::UndefinedRate("no trials completed".to_string()));
    }
    let total: f64 = trials.iter().map(TrialResult::secs).sum();
    Ok(total / trials.len() as f64)
}

/// Documents per second. Zero or non-finite elapsed time has no defined rate.
pub fn insertion_rate(num_docs: usize, avg_elapsed: f64) -> Result<f64, BenchError> {
    if !avg_elapsed.is_finite() || avg_elapsed <= 0.0 {
        return Err(BenchError::UndefinedRate(format!(
            "average elapsed time is {} seconds",
            avg_elapsed
        )));
    }
    Ok(num_docs as f64 / avg_elapsed)
}

/// Per-endpoint summary of a completed trial loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointReport {
    pub name: String,
    pub num_docs: usize,
    pub trials: Vec<TrialResult>,
    pub avg_elapsed: f64,
    pub rate: f64,
}

impl EndpointReport {
    pub fn new(name: &str, num_docs: usize, trials: Vec<TrialResult>) -> Result<Self, BenchError> {
        let avg_elapsed = mean_elapsed(&trials)?;
        let rate = insertion_rate(num_docs, avg_elapsed)?;
        Ok(Self {
            name: name.to_string(),
            num_docs,
            trials,
            avg_elapsed,
            rate,
        })
    }
}

impl fmt::Display for EndpointReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Database: {}\nNumber of documents inserted: {}\nElapsed time: {:.6} seconds\nInsertion rate: {:.6} documents per second",
            self.name, self.num_docs, self.avg_elapsed, self.rate
        )
    }
}

/// What happened to one endpoint's trial loop.
#[derive(Debug)]
pub struct EndpointOutcome {
    pub name: String,
    pub result: Result<EndpointReport, BenchError>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<EndpointOutcome>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn reports(&self) -> impl Iterator<Item = &EndpointReport> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &BenchError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    /// Process exit status for a run that got past every fatal stage.
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_WRITE_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trials(millis: &[u64]) -> Vec<TrialResult> {
        millis
            .iter()
            .map(|m| TrialResult::new(Duration::from_millis(*m)))
            .collect()
    }

    #[test]
    fn test_mean_elapsed() {
        let mean = mean_elapsed(&trials(&[100, 200, 600])).unwrap();
        assert!((mean - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_mean_of_nothing() {
        assert!(matches!(
            mean_elapsed(&[]),
            Err(BenchError::UndefinedRate(_))
        ));
    }

    #[test]
    fn test_rate() {
        let rate = insertion_rate(1000, 0.5).unwrap();
        assert_eq!(rate, 2000.0);
    }

    #[test]
    fn test_zero_elapsed_has_no_rate() {
        assert!(matches!(
            insertion_rate(1000, 0.0),
            Err(BenchError::UndefinedRate(_))
        ));
        assert!(insertion_rate(1000, f64::NAN).is_err());
    }

    #[test]
    fn test_report_zero_trials_time() {
        let result = EndpointReport::new("MongoDB", 10, trials(&[0, 0]));
        assert!(matches!(result, Err(BenchError::UndefinedRate(_))));
    }

    #[test]
    fn test_report_display() {
        let report = EndpointReport::new("DocDB", 500, trials(&[250, 250])).unwrap();
        assert_eq!(
            report.to_string(),
            "Database: DocDB\nNumber of documents inserted: 500\nElapsed time: 0.250000 seconds\nInsertion rate: 2000.000000 documents per second"
        );
    }

    #[test]
    fn test_summary_partial_failure() {
        let summary = RunSummary {
            outcomes: vec![
                EndpointOutcome {
                    name: "MongoDB".to_string(),
                    result: EndpointReport::new("MongoDB", 1, trials(&[1])),
                },
                EndpointOutcome {
                    name: "DocDB".to_string(),
                    result: Err(BenchError::WriteFailure {
                        endpoint: "DocDB".to_string(),
                        reason: "boom".to_string(),
                    }),
                },
            ],
        };
        assert!(!summary.is_success());
        assert_eq!(summary.reports().count(), 1);
        assert_eq!(summary.failures().map(|(n, _)| n).collect::<Vec<_>>(), vec!["DocDB"]);
        assert_eq!(summary.exit_status(), EXIT_WRITE_FAILURE);
    }

    #[test]
    fn test_summary_success_exit_status() {
        let summary = RunSummary {
            outcomes: vec![EndpointOutcome {
                name: "MongoDB".to_string(),
                result: EndpointReport::new("MongoDB", 1, trials(&[1])),
            }],
        };
        assert_eq!(summary.exit_status(), EXIT_SUCCESS);
    }
}

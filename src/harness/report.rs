//! Sample aggregation and reporting.

use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::runner::BenchmarkOutcome;
use crate::errors::BenchError;

/// Summary statistics over measured samples, in nanoseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub min_ns: u64,
    pub max_ns: u64,
    pub mean_ns: f64,
    pub median_ns: u64,
    pub p95_ns: u64,
    /// Population variance
    pub variance_ns2: f64,
    pub std_dev_ns: f64,
}

impl Statistics {
    /// Returns `None` for an empty sample set.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let len = sorted.len();

        let sum: u128 = sorted.iter().map(|&s| u128::from(s)).sum();
        let mean = sum as f64 / len as f64;
        let median = if len % 2 == 0 {
            sorted[len / 2 - 1].midpoint(sorted[len / 2])
        } else {
            sorted[len / 2]
        };
        let variance = sorted
            .iter()
            .map(|&s| {
                let diff = s as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / len as f64;
        let p95_idx = ((len as f64) * 0.95).ceil() as usize;

        Some(Self {
            min_ns: sorted[0],
            max_ns: sorted[len - 1],
            mean_ns: mean,
            median_ns: median,
            p95_ns: sorted[p95_idx.clamp(1, len) - 1],
            variance_ns2: variance,
            std_dev_ns: variance.sqrt(),
        })
    }
}

/// Result of one completed benchmark
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub test_name: String,
    pub iteration_count: usize,
    pub warmup_count: usize,
    /// One entry per measured iteration, in execution order
    pub samples_ns: Vec<u64>,
    pub statistics: Option<Statistics>,
    pub timestamp: String,
}

impl BenchmarkReport {
    pub(crate) fn new(
        test_name: &str,
        iteration_count: usize,
        warmup_count: usize,
        samples: &[Duration],
    ) -> Self {
        let samples_ns: Vec<u64> = samples
            .iter()
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .collect();
        Self {
            test_name: test_name.to_string(),
            iteration_count,
            warmup_count,
            statistics: Statistics::from_samples(&samples_ns),
            samples_ns,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples_ns.len()
    }

    /// Mean sample, if any were measured
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn mean(&self) -> Option<Duration> {
        self.statistics
            .as_ref()
            .map(|s| Duration::from_nanos(s.mean_ns as u64))
    }

    /// Emit the summary line through `tracing`
    pub fn log(&self) {
        match &self.statistics {
            Some(stats) => tracing::info!(
                test = %self.test_name,
                samples = self.samples_ns.len(),
                mean_us = stats.mean_ns / 1_000.0,
                median_us = stats.median_ns / 1_000,
                std_dev_us = stats.std_dev_ns / 1_000.0,
                "Benchmark complete"
            ),
            None => tracing::info!(test = %self.test_name, "Benchmark complete, no samples"),
        }
    }

    /// Write `<dir>/<test_name>.json` and return its path
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or the file cannot be written.
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf, BenchError> {
        std::fs::create_dir_all(dir).map_err(|e| BenchError::io(dir, e))?;
        let path = dir.join(format!("{}.json", self.test_name));
        let body = serde_json::to_vec_pretty(self)?;
        std::fs::write(&path, body).map_err(|e| BenchError::io(&path, e))?;
        Ok(path)
    }
}

/// Outcomes of a suite run, in execution order
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<BenchmarkOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> impl Iterator<Item = &BenchmarkReport> {
        self.outcomes.iter().filter_map(BenchmarkOutcome::report)
    }

    pub fn failed(&self) -> impl Iterator<Item = &BenchmarkOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(BenchmarkOutcome::is_success)
    }

    /// Human-readable table, one line per benchmark
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<48} {:>8} {:>14} {:>14}",
            "benchmark", "samples", "mean (us)", "std dev (us)"
        );
        for outcome in &self.outcomes {
            match outcome {
                BenchmarkOutcome::Completed(report) => match &report.statistics {
                    Some(stats) => {
                        let _ = writeln!(
                            out,
                            "{:<48} {:>8} {:>14.1} {:>14.1}",
                            report.test_name,
                            report.sample_count(),
                            stats.mean_ns / 1_000.0,
                            stats.std_dev_ns / 1_000.0
                        );
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "{:<48} {:>8} {:>14} {:>14}",
                            report.test_name, 0, "-", "-"
                        );
                    }
                },
                BenchmarkOutcome::SetupFailed { name, error } => {
                    let _ = writeln!(out, "{name:<48} SETUP FAILED: {error}");
                }
                BenchmarkOutcome::RunFailed {
                    name,
                    iteration,
                    error,
                    ..
                } => {
                    let _ = writeln!(out, "{name:<48} FAILED at iteration {iteration}: {error}");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_empty() {
        assert!(Statistics::from_samples(&[]).is_none());
    }

    #[test]
    fn test_statistics_odd() {
        let stats = Statistics::from_samples(&[30, 10, 20]).unwrap();
        assert_eq!(stats.min_ns, 10);
        assert_eq!(stats.max_ns, 30);
        assert_eq!(stats.median_ns, 20);
        assert!((stats.mean_ns - 20.0).abs() < f64::EPSILON);
        assert!((stats.variance_ns2 - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.p95_ns, 30);
    }

    #[test]
    fn test_statistics_even_median() {
        let stats = Statistics::from_samples(&[4, 1, 3, 2]).unwrap();
        assert_eq!(stats.median_ns, 2);
        assert_eq!(stats.min_ns, 1);
        assert_eq!(stats.max_ns, 4);
    }

    #[test]
    fn test_statistics_single_sample() {
        let stats = Statistics::from_samples(&[7]).unwrap();
        assert_eq!(stats.p95_ns, 7);
        assert!(stats.std_dev_ns.abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_serializes_samples() {
        let report = BenchmarkReport::new(
            "json",
            2,
            1,
            &[Duration::from_micros(1), Duration::from_micros(3)],
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["test_name"], "json");
        assert_eq!(value["samples_ns"], serde_json::json!([1_000, 3_000]));
        assert_eq!(report.mean(), Some(Duration::from_micros(2)));
    }
}

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Duration;

use super::collector::Harness;
use super::definition::TestDefinition;
use super::report::{BenchmarkReport, SuiteReport};
use crate::config::TestConfig;
use crate::errors::BenchError;

/// Lifecycle of a single benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    SetupDone,
    Iterating,
    Complete,
    SetupFailed,
    RunFailed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::SetupDone => "setup done",
            Self::Iterating => "iterating",
            Self::Complete => "complete",
            Self::SetupFailed => "failed during setup",
            Self::RunFailed => "failed during run",
        };
        f.write_str(name)
    }
}

/// How a benchmark ended
#[derive(Debug)]
pub enum BenchmarkOutcome {
    Completed(BenchmarkReport),
    SetupFailed {
        name: String,
        error: BenchError,
    },
    RunFailed {
        name: String,
        /// Index of the failing iteration, warmups included
        iteration: usize,
        warmup: bool,
        error: BenchError,
    },
}

impl BenchmarkOutcome {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Completed(report) => &report.test_name,
            Self::SetupFailed { name, .. } | Self::RunFailed { name, .. } => name,
        }
    }

    /// Terminal phase this outcome corresponds to
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Completed(_) => Phase::Complete,
            Self::SetupFailed { .. } => Phase::SetupFailed,
            Self::RunFailed { .. } => Phase::RunFailed,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    #[must_use]
    pub fn report(&self) -> Option<&BenchmarkReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&BenchError> {
        match self {
            Self::Completed(_) => None,
            Self::SetupFailed { error, .. } | Self::RunFailed { error, .. } => Some(error),
        }
    }

    /// # Errors
    ///
    /// Returns the failure carried by a non-completed outcome.
    pub fn into_result(self) -> Result<BenchmarkReport, BenchError> {
        match self {
            Self::Completed(report) => Ok(report),
            Self::SetupFailed { error, .. } | Self::RunFailed { error, .. } => Err(error),
        }
    }
}

/// Executes benchmark definitions one at a time on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRunner {
    results_dir: Option<PathBuf>,
}

impl BenchmarkRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that writes JSON reports where the config says to
    #[must_use]
    pub fn from_config(config: &TestConfig) -> Self {
        Self {
            results_dir: config.results_dir.clone(),
        }
    }

    #[must_use]
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = Some(dir.into());
        self
    }

    /// Run one benchmark: setup once, then `warmup + iterations` run cycles.
    ///
    /// Never panics on behalf of the definition. Setup and run failures,
    /// panics included, come back as a failed outcome.
    pub fn run(&self, definition: TestDefinition) -> BenchmarkOutcome {
        let TestDefinition {
            name,
            iteration_count,
            warmup_count,
            setup,
            mut run,
        } = definition;

        let span = tracing::info_span!("benchmark", test = %name);
        let _entered = span.enter();
        tracing::info!(iteration_count, warmup_count, "Starting benchmark");

        let mut phase = Phase::NotStarted;
        tracing::debug!(%phase);

        if let Err(cause) = catch(setup) {
            let error = BenchError::setup(&name, cause);
            error.log(&name);
            return BenchmarkOutcome::SetupFailed { name, error };
        }
        phase = Phase::SetupDone;
        tracing::debug!(%phase);

        phase = Phase::Iterating;
        tracing::debug!(%phase);

        let mut harness = Harness::default();
        let mut samples: Vec<Duration> = Vec::with_capacity(iteration_count);

        for iteration in 0..warmup_count + iteration_count {
            let warmup = iteration < warmup_count;
            harness.begin_iteration(iteration, warmup);

            if let Err(error) = catch(|| run(&mut harness)) {
                error.log(&name);
                return BenchmarkOutcome::RunFailed {
                    name,
                    iteration,
                    warmup,
                    error,
                };
            }

            if harness.windows() == 0 {
                tracing::warn!(iteration, "Iteration never opened a collection window");
            }
            tracing::trace!(iteration, warmup, collected = ?harness.collected());

            if !warmup {
                samples.push(harness.collected());
            }
        }

        phase = Phase::Complete;
        tracing::debug!(%phase);

        let report = BenchmarkReport::new(&name, iteration_count, warmup_count, &samples);
        report.log();

        if let Some(dir) = &self.results_dir {
            match report.write_json(dir) {
                Ok(path) => tracing::debug!(path = %path.display(), "Report written"),
                // The measurement itself succeeded.
                Err(error) => error.log(&name),
            }
        }

        BenchmarkOutcome::Completed(report)
    }

    /// Run every definition in order. A failing benchmark does not stop the rest.
    pub fn run_all<I>(&self, definitions: I) -> SuiteReport
    where
        I: IntoIterator<Item = TestDefinition>,
    {
        let outcomes: Vec<BenchmarkOutcome> =
            definitions.into_iter().map(|d| self.run(d)).collect();
        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        tracing::info!(total = outcomes.len(), failed, "Suite finished");
        SuiteReport { outcomes }
    }
}

/// Invoke a callback, turning panics into [`BenchError::Panicked`]
fn catch<F>(f: F) -> Result<(), BenchError>
where
    F: FnOnce() -> Result<(), BenchError>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(BenchError::panicked(panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

use std::fmt;

use super::collector::Harness;
use super::report::BenchmarkReport;
use super::runner::BenchmarkRunner;
use crate::errors::BenchError;

pub type SetupFn = Box<dyn FnOnce() -> Result<(), BenchError>>;
pub type RunFn = Box<dyn FnMut(&mut Harness) -> Result<(), BenchError>>;

/// A named benchmark: how many times to run, what to prepare, what to measure.
///
/// Built through [`TestDefinition::builder`] and immutable afterwards.
///
/// ```rust,ignore
/// TestDefinition::builder("Query_Funcletization_NewQueryInstance")
///     .iteration_count(50)
///     .warmup_count(5)
///     .setup(|| ensure_database_setup(&url))
///     .run(move |harness| {
///         let context = OrdersContext::connect(&url)?;
///         let _collection = harness.start_collection();
///         // measured work
///         Ok(())
///     })
///     .build()?
///     .run_test()?;
/// ```
pub struct TestDefinition {
    pub(crate) name: String,
    pub(crate) iteration_count: usize,
    pub(crate) warmup_count: usize,
    pub(crate) setup: SetupFn,
    pub(crate) run: RunFn,
}

impl TestDefinition {
    pub fn builder(name: impl Into<String>) -> TestDefinitionBuilder {
        TestDefinitionBuilder {
            name: name.into(),
            iteration_count: 0,
            warmup_count: 0,
            setup: None,
            run: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn iteration_count(&self) -> usize {
        self.iteration_count
    }

    #[must_use]
    pub fn warmup_count(&self) -> usize {
        self.warmup_count
    }

    /// Run this definition with a default runner.
    ///
    /// # Errors
    ///
    /// Returns the setup failure (wrapped in [`BenchError::Setup`]) or the first
    /// failing iteration's error.
    pub fn run_test(self) -> Result<BenchmarkReport, BenchError> {
        BenchmarkRunner::default().run(self).into_result()
    }
}

impl fmt::Debug for TestDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDefinition")
            .field("name", &self.name)
            .field("iteration_count", &self.iteration_count)
            .field("warmup_count", &self.warmup_count)
            .finish_non_exhaustive()
    }
}

#[must_use]
pub struct TestDefinitionBuilder {
    name: String,
    iteration_count: usize,
    warmup_count: usize,
    setup: Option<SetupFn>,
    run: Option<RunFn>,
}

impl TestDefinitionBuilder {
    /// Number of measured iterations
    pub fn iteration_count(mut self, count: usize) -> Self {
        self.iteration_count = count;
        self
    }

    /// Number of iterations run before measuring, whose samples are dropped
    pub fn warmup_count(mut self, count: usize) -> Self {
        self.warmup_count = count;
        self
    }

    pub fn setup<F>(mut self, setup: F) -> Self
    where
        F: FnOnce() -> Result<(), BenchError> + 'static,
    {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn run<F>(mut self, run: F) -> Self
    where
        F: FnMut(&mut Harness) -> Result<(), BenchError> + 'static,
    {
        self.run = Some(Box::new(run));
        self
    }

    /// # Errors
    ///
    /// Fails with [`BenchError::Configuration`] when the name is blank, is not
    /// usable as a report file name, or no run callback was given.
    pub fn build(self) -> Result<TestDefinition, BenchError> {
        if self.name.trim().is_empty() {
            return Err(BenchError::configuration("Test name must not be empty"));
        }
        // The name becomes `<results_dir>/<name>.json`
        if self.name.contains(['/', '\\', '\0']) || matches!(self.name.as_str(), "." | "..")
        {
            return Err(BenchError::configuration(format!(
                "Test name '{}' must not contain path separators",
                self.name.escape_default()
            )));
        }
        let Some(run) = self.run else {
            return Err(BenchError::configuration(format!(
                "Test '{}' has no run callback",
                self.name
            )));
        };

        Ok(TestDefinition {
            name: self.name,
            iteration_count: self.iteration_count,
            warmup_count: self.warmup_count,
            setup: self.setup.unwrap_or_else(|| Box::new(|| Ok(()))),
            run,
        })
    }
}

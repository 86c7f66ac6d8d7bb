//! Benchmark definition and execution.
//!
//! A [`TestDefinition`] declares a benchmark. The [`BenchmarkRunner`] runs its
//! setup once, then its run callback for every warmup and measured iteration.
//! Inside the run callback, [`Harness::start_collection`] marks the measured
//! region.

pub mod collector;
pub mod definition;
pub mod report;
pub mod runner;

pub use collector::{CollectionScope, Harness};
pub use definition::{TestDefinition, TestDefinitionBuilder};
pub use report::{BenchmarkReport, Statistics, SuiteReport};
pub use runner::{BenchmarkOutcome, BenchmarkRunner, Phase};

//! Benchmark suites built on the harness.

pub mod funcletization;

pub use funcletization::{FuncletizationSuite, ValueHolder};

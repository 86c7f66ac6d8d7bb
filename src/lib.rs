//! Micro-benchmark harness for ORM query funcletization.
//!
//! - [`harness`]: benchmark definitions, the runner and its scoped collection window
//! - [`query`]: a blocking query layer whose predicates capture values by closure
//! - [`models`] and [`seed`]: the orders schema and its deterministic fixture data
//! - [`scenarios`]: the funcletization benchmark suite
//!
//! ```rust,ignore
//! use ormbench::{BenchmarkRunner, FuncletizationSuite, TestConfig};
//!
//! let config = TestConfig::instance()?;
//! let suite = FuncletizationSuite::from_config(config)?;
//! let report = BenchmarkRunner::from_config(config).run_all(suite.definitions()?);
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod errors;
pub mod harness;
pub mod models;
pub mod query;
pub mod scenarios;
pub mod seed;

pub use config::TestConfig;
pub use errors::{BenchError, ErrorKind, ensure_equal};
pub use harness::{
    BenchmarkOutcome, BenchmarkReport, BenchmarkRunner, CollectionScope, Harness, SuiteReport,
    TestDefinition,
};
pub use query::{Operand, OrdersContext, Predicate, Query};
pub use scenarios::FuncletizationSuite;
pub use seed::{OrdersSeedData, SeedShape, SeedStatus};

//! Query funcletization scenarios.
//!
//! Each scenario opens a context outside the measured window. Inside it, the
//! scenario executes `products where product_id < 11` many times, and every
//! execution must return exactly ten rows. The scenarios differ only in how the
//! bound reaches the predicate and whether the query object is reused.

use crate::config::TestConfig;
use crate::errors::{BenchError, ensure_equal};
use crate::harness::{Harness, TestDefinition};
use crate::models::product;
use crate::query::{Operand, OrdersContext, Predicate};
use crate::seed::OrdersSeedData;

pub const DATABASE_NAME: &str = "perf_query_funcletization";
pub const FUNCLETIZATION_ITERATION_COUNT: usize = 100;
pub const ITERATION_COUNT: usize = 50;
pub const WARMUP_COUNT: usize = 5;

pub const PRODUCT_COUNT: usize = 100;
/// Products with an id below this bound are expected
pub const PRODUCT_ID_BOUND: i32 = 11;
pub const EXPECTED_MATCHES: usize = 10;

/// Holds the bound behind two levels of accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueHolder {
    first_level_property: i32,
}

impl Default for ValueHolder {
    fn default() -> Self {
        Self {
            first_level_property: PRODUCT_ID_BOUND,
        }
    }
}

impl ValueHolder {
    #[must_use]
    pub fn first_level_property(&self) -> i32 {
        self.first_level_property
    }

    #[must_use]
    pub fn second_level_property(&self) -> i32 {
        self.first_level_property()
    }
}

#[derive(Debug, Clone)]
pub struct FuncletizationSuite {
    connection_string: String,
    iteration_count: usize,
    warmup_count: usize,
    queries_per_iteration: usize,
}

impl FuncletizationSuite {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            iteration_count: ITERATION_COUNT,
            warmup_count: WARMUP_COUNT,
            queries_per_iteration: FUNCLETIZATION_ITERATION_COUNT,
        }
    }

    /// Suite against the configured `perf_query_funcletization` database
    ///
    /// # Errors
    ///
    /// Fails when the SQLite data directory cannot be created.
    pub fn from_config(config: &TestConfig) -> Result<Self, BenchError> {
        config.ensure_data_dir()?;
        Ok(Self::new(config.connection_string(DATABASE_NAME)))
    }

    #[must_use]
    pub fn with_iterations(mut self, iteration_count: usize, warmup_count: usize) -> Self {
        self.iteration_count = iteration_count;
        self.warmup_count = warmup_count;
        self
    }

    #[must_use]
    pub fn with_queries_per_iteration(mut self, count: usize) -> Self {
        self.queries_per_iteration = count;
        self
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Seed 100 products and nothing else
    ///
    /// # Errors
    ///
    /// Fails when the database is unreachable or seeding fails.
    pub fn ensure_database_setup(connection_string: &str) -> Result<(), BenchError> {
        OrdersSeedData::ensure_created(connection_string, PRODUCT_COUNT, 0, 0, 0)?;
        Ok(())
    }

    /// A new query is built for every execution
    ///
    /// # Errors
    ///
    /// Fails only if the definition itself is malformed.
    pub fn new_query_instance(&self) -> Result<TestDefinition, BenchError> {
        let queries = self.queries_per_iteration;
        self.definition(
            "Query_Funcletization_NewQueryInstance",
            move |context, harness| {
                let _collection = harness.start_collection();
                let val = PRODUCT_ID_BOUND;
                for _ in 0..queries {
                    let result = context
                        .products()
                        .filter(Predicate::lt(
                            product::Column::ProductId,
                            Operand::captured(|| val),
                        ))
                        .to_list()?;

                    ensure_equal(EXPECTED_MATCHES, result.len(), "matching products")?;
                }
                Ok(())
            },
        )
    }

    /// One query object is executed repeatedly
    ///
    /// # Errors
    ///
    /// Fails only if the definition itself is malformed.
    pub fn same_query_instance(&self) -> Result<TestDefinition, BenchError> {
        let queries = self.queries_per_iteration;
        self.definition(
            "Query_Funcletization_SameQueryInstance",
            move |context, harness| {
                let _collection = harness.start_collection();
                let val = PRODUCT_ID_BOUND;
                let query = context.products().filter(Predicate::lt(
                    product::Column::ProductId,
                    Operand::captured(|| val),
                ));

                for _ in 0..queries {
                    let result = query.to_list()?;

                    ensure_equal(EXPECTED_MATCHES, result.len(), "matching products")?;
                }
                Ok(())
            },
        )
    }

    /// The bound is read through an accessor chain on a captured object
    ///
    /// # Errors
    ///
    /// Fails only if the definition itself is malformed.
    pub fn value_from_object(&self) -> Result<TestDefinition, BenchError> {
        let queries = self.queries_per_iteration;
        self.definition(
            "Query_Funcletization_ValueFromObject",
            move |context, harness| {
                let _collection = harness.start_collection();
                let value_holder = ValueHolder::default();
                for _ in 0..queries {
                    let result = context
                        .products()
                        .filter(Predicate::lt(
                            product::Column::ProductId,
                            Operand::captured(|| value_holder.second_level_property()),
                        ))
                        .to_list()?;

                    ensure_equal(EXPECTED_MATCHES, result.len(), "matching products")?;
                }
                Ok(())
            },
        )
    }

    /// All three scenarios, in declaration order
    ///
    /// # Errors
    ///
    /// Fails only if a definition is malformed.
    pub fn definitions(&self) -> Result<Vec<TestDefinition>, BenchError> {
        Ok(vec![
            self.new_query_instance()?,
            self.same_query_instance()?,
            self.value_from_object()?,
        ])
    }

    /// Common shape: seed once, then per iteration open a context outside the
    /// window and hand it to `body`.
    fn definition<F>(&self, name: &str, mut body: F) -> Result<TestDefinition, BenchError>
    where
        F: FnMut(&OrdersContext, &mut Harness) -> Result<(), BenchError> + 'static,
    {
        let setup_connection = self.connection_string.clone();
        let run_connection = self.connection_string.clone();

        TestDefinition::builder(name)
            .iteration_count(self.iteration_count)
            .warmup_count(self.warmup_count)
            .setup(move || Self::ensure_database_setup(&setup_connection))
            .run(move |harness| {
                let context = OrdersContext::connect(&run_connection)?;
                body(&context, harness)
            })
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_holder_chain() {
        let holder = ValueHolder::default();
        assert_eq!(holder.first_level_property(), 11);
        assert_eq!(holder.second_level_property(), holder.first_level_property());
    }

    #[test]
    fn test_definitions_carry_names_and_counts() {
        let suite = FuncletizationSuite::new("sqlite::memory:");
        let names: Vec<String> = suite
            .definitions()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Query_Funcletization_NewQueryInstance",
                "Query_Funcletization_SameQueryInstance",
                "Query_Funcletization_ValueFromObject",
            ]
        );

        let definition = suite.with_iterations(3, 1).same_query_instance().unwrap();
        assert_eq!(definition.iteration_count(), 3);
        assert_eq!(definition.warmup_count(), 1);
    }
}

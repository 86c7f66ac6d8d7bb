use std::cell::Cell;

use ormbench::models::product;
use ormbench::scenarios::funcletization::{EXPECTED_MATCHES, PRODUCT_ID_BOUND};
use ormbench::{
    BenchmarkRunner, FuncletizationSuite, Operand, OrdersContext, Predicate, scenarios::ValueHolder,
};
use sea_orm::Value;

mod common;
use common::TestDatabase;

fn small_suite(db: &TestDatabase) -> FuncletizationSuite {
    FuncletizationSuite::new(db.url())
        .with_iterations(3, 1)
        .with_queries_per_iteration(10)
}

#[test]
fn test_new_query_instance() {
    let db = TestDatabase::new("new_query_instance");
    let report = small_suite(&db)
        .new_query_instance()
        .unwrap()
        .run_test()
        .expect("NewQueryInstance should pass");

    assert_eq!(report.test_name, "Query_Funcletization_NewQueryInstance");
    assert_eq!(report.sample_count(), 3);
}

#[test]
fn test_same_query_instance() {
    let db = TestDatabase::new("same_query_instance");
    let report = small_suite(&db)
        .same_query_instance()
        .unwrap()
        .run_test()
        .expect("SameQueryInstance should pass");

    assert_eq!(report.test_name, "Query_Funcletization_SameQueryInstance");
    assert_eq!(report.sample_count(), 3);
}

#[test]
fn test_value_from_object() {
    let db = TestDatabase::new("value_from_object");
    let report = small_suite(&db)
        .value_from_object()
        .unwrap()
        .run_test()
        .expect("ValueFromObject should pass");

    assert_eq!(report.test_name, "Query_Funcletization_ValueFromObject");
    assert_eq!(report.sample_count(), 3);
}

#[test]
fn test_full_suite_with_default_counts() {
    let db = TestDatabase::new("full_suite");
    let suite = FuncletizationSuite::new(db.url());

    let report = BenchmarkRunner::new().run_all(suite.definitions().unwrap());

    assert!(report.is_success(), "{}", report.summary());
    for benchmark in report.passed() {
        assert_eq!(benchmark.sample_count(), 50);
        assert_eq!(benchmark.warmup_count, 5);
    }
}

#[test]
fn test_repeated_count_is_stable() {
    let db = TestDatabase::new("repeated_count");
    FuncletizationSuite::ensure_database_setup(&db.url()).unwrap();
    let context = OrdersContext::connect(&db.url()).unwrap();

    let val = PRODUCT_ID_BOUND;
    let query = context.products().filter(Predicate::lt(
        product::Column::ProductId,
        Operand::captured(|| val),
    ));
    for _ in 0..100 {
        assert_eq!(query.count().unwrap(), 10);
    }
    drop(query);
    context.close().unwrap();
}

#[test]
fn test_property_chain_resolves_to_same_literal() {
    let db = TestDatabase::new("property_chain");
    FuncletizationSuite::ensure_database_setup(&db.url()).unwrap();
    let context = OrdersContext::connect(&db.url()).unwrap();

    let holder = ValueHolder::default();
    let val = PRODUCT_ID_BOUND;
    let through_object = context.products().filter(Predicate::lt(
        product::Column::ProductId,
        Operand::captured(|| holder.second_level_property()),
    ));
    let through_local = context.products().filter(Predicate::lt(
        product::Column::ProductId,
        Operand::captured(|| val),
    ));

    assert_eq!(
        through_object.funcletize().parameters,
        vec![Value::Int(Some(11))]
    );
    assert_eq!(
        through_object.funcletize().parameters,
        through_local.funcletize().parameters
    );
    assert_eq!(
        through_object.statement().to_string(),
        through_local.statement().to_string()
    );

    let from_object = through_object.to_list().unwrap();
    let from_local = through_local.to_list().unwrap();
    assert_eq!(from_object.len(), EXPECTED_MATCHES);
    assert_eq!(from_object, from_local);
}

#[test]
fn test_reused_query_sees_new_captured_value() {
    let db = TestDatabase::new("reused_query");
    FuncletizationSuite::ensure_database_setup(&db.url()).unwrap();
    let context = OrdersContext::connect(&db.url()).unwrap();

    let bound = Cell::new(PRODUCT_ID_BOUND);
    let query = context.products().filter(Predicate::lt(
        product::Column::ProductId,
        Operand::captured(|| bound.get()),
    ));

    assert_eq!(query.to_list().unwrap().len(), 10);
    bound.set(21);
    assert_eq!(query.to_list().unwrap().len(), 20);
    bound.set(1);
    assert!(query.to_list().unwrap().is_empty());
}

#[test]
fn test_results_are_ordered_by_key() {
    let db = TestDatabase::new("ordered_results");
    FuncletizationSuite::ensure_database_setup(&db.url()).unwrap();
    let context = OrdersContext::connect(&db.url()).unwrap();

    let ids: Vec<i32> = context
        .products()
        .filter(Predicate::lt(
            product::Column::ProductId,
            Operand::constant(PRODUCT_ID_BOUND),
        ))
        .to_list()
        .unwrap()
        .into_iter()
        .map(|p| p.product_id)
        .collect();

    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_unreachable_store_fails_setup() {
    common::init_tracing();
    let dir = std::env::temp_dir().join(format!("ormbench-missing-{}", uuid::Uuid::new_v4()));
    // Directory does not exist and mode=rw refuses to create the file
    let url = format!("sqlite://{}?mode=rw", dir.join("absent.sqlite").display());

    let err = FuncletizationSuite::new(url)
        .with_iterations(1, 0)
        .new_query_instance()
        .unwrap()
        .run_test()
        .unwrap_err();

    assert_eq!(err.kind(), ormbench::ErrorKind::Setup);
}

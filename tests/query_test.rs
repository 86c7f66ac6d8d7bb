use ormbench::models::{customer, order, product};
use ormbench::scenarios::funcletization::PRODUCT_ID_BOUND;
use ormbench::{FuncletizationSuite, Operand, OrdersContext, OrdersSeedData, Predicate};
use sea_orm::Order;

mod common;
use common::TestDatabase;

fn seeded_products(prefix: &str) -> (TestDatabase, OrdersContext) {
    let db = TestDatabase::new(prefix);
    FuncletizationSuite::ensure_database_setup(&db.url()).unwrap();
    let context = OrdersContext::connect(&db.url()).unwrap();
    (db, context)
}

#[test]
fn test_first_honours_descending_order() {
    let (_db, context) = seeded_products("query_first_desc");

    let last_match = context
        .products()
        .filter(Predicate::lt(
            product::Column::ProductId,
            Operand::constant(PRODUCT_ID_BOUND),
        ))
        .order_by(product::Column::ProductId, Order::Desc)
        .first()
        .unwrap()
        .expect("ten products match");

    assert_eq!(last_match.product_id, 10);
}

#[test]
fn test_first_defaults_to_key_order() {
    let (_db, context) = seeded_products("query_first_default");

    let first = context.products().first().unwrap().unwrap();
    assert_eq!(first.product_id, 1);
}

#[test]
fn test_first_on_empty_result_is_none() {
    let (_db, context) = seeded_products("query_first_empty");

    let none = context
        .products()
        .filter(Predicate::gt(product::Column::ProductId, Operand::constant(1_000)))
        .first()
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn test_take_limits_to_list() {
    let (_db, context) = seeded_products("query_take");

    let ids: Vec<i32> = context
        .products()
        .filter(Predicate::lt(
            product::Column::ProductId,
            Operand::constant(PRODUCT_ID_BOUND),
        ))
        .order_by(product::Column::ProductId, Order::Desc)
        .take(3)
        .to_list()
        .unwrap()
        .into_iter()
        .map(|p| p.product_id)
        .collect();

    assert_eq!(ids, vec![10, 9, 8]);
}

#[test]
fn test_count_ignores_take() {
    let (_db, context) = seeded_products("query_count_take");

    let val = PRODUCT_ID_BOUND;
    let query = context
        .products()
        .filter(Predicate::lt(
            product::Column::ProductId,
            Operand::captured(|| val),
        ))
        .take(3);

    assert_eq!(query.to_list().unwrap().len(), 3);
    assert_eq!(query.count().unwrap(), 10);
}

#[test]
fn test_take_is_part_of_statement() {
    let (_db, context) = seeded_products("query_take_sql");

    let sql = context.products().take(3).statement().to_string();
    assert!(sql.contains("LIMIT 3"), "{sql}");
}

#[test]
fn test_queries_over_related_tables() {
    let db = TestDatabase::new("query_related");
    OrdersSeedData::ensure_created(&db.url(), 10, 4, 3, 2).unwrap();
    let context = OrdersContext::connect(&db.url()).unwrap();

    let customer_id = 2;
    let orders = context
        .orders()
        .filter(Predicate::eq(
            order::Column::CustomerId,
            Operand::captured(|| customer_id),
        ))
        .to_list()
        .unwrap();
    assert_eq!(orders.len(), 3);
    assert!(orders.iter().all(|o| o.customer_id == 2));

    let newest = context
        .customers()
        .order_by(customer::Column::CustomerId, Order::Desc)
        .first()
        .unwrap()
        .unwrap();
    assert_eq!(newest.customer_id, 4);
}

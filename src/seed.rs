//! Deterministic fixture data for the orders schema.
//!
//! [`OrdersSeedData::ensure_created`] is idempotent. It creates the schema if
//! needed and leaves the data alone when the row counts already match the
//! requested shape. Otherwise it wipes and reseeds the tables inside one
//! transaction.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use crate::errors::BenchError;
use crate::models::{OrdersMigrator, customer, order, order_line, product};
use crate::query::OrdersContext;

const BATCH_SIZE: usize = 100;
const BASE_ORDER_TIMESTAMP: i64 = 1_704_067_200; // 2024-01-01T00:00:00Z
const SECONDS_PER_DAY: i64 = 86_400;

/// Number of rows wanted in each table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedShape {
    pub product_count: usize,
    pub customer_count: usize,
    pub orders_per_customer: usize,
    pub lines_per_order: usize,
}

impl SeedShape {
    #[must_use]
    pub fn new(
        product_count: usize,
        customer_count: usize,
        orders_per_customer: usize,
        lines_per_order: usize,
    ) -> Self {
        Self {
            product_count,
            customer_count,
            orders_per_customer,
            lines_per_order,
        }
    }

    /// Total `(products, customers, orders, order lines)`
    ///
    /// # Errors
    ///
    /// Fails when the shape cannot be satisfied: counts that overflow an `i32`
    /// key, or order lines without any product to point at.
    pub fn totals(&self) -> Result<(i32, i32, i32, i32), BenchError> {
        let orders = self
            .customer_count
            .checked_mul(self.orders_per_customer)
            .ok_or_else(|| BenchError::configuration("Order count overflows"))?;
        let lines = orders
            .checked_mul(self.lines_per_order)
            .ok_or_else(|| BenchError::configuration("Order line count overflows"))?;

        if lines > 0 && self.product_count == 0 {
            return Err(BenchError::configuration(
                "Order lines require at least one product",
            ));
        }

        Ok((
            to_key(self.product_count, "product_count")?,
            to_key(self.customer_count, "customer_count")?,
            to_key(orders, "order count")?,
            to_key(lines, "order line count")?,
        ))
    }
}

fn to_key(count: usize, what: &str) -> Result<i32, BenchError> {
    i32::try_from(count)
        .map_err(|_| BenchError::configuration(format!("{what} {count} exceeds the key range")))
}

/// What `ensure_created` had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStatus {
    AlreadySeeded,
    Seeded,
}

pub struct OrdersSeedData;

impl OrdersSeedData {
    /// Make sure the database behind `connection_string` holds exactly the
    /// requested fixture data.
    ///
    /// # Errors
    ///
    /// Fails on an impossible shape, an unreachable database or a failed insert.
    pub fn ensure_created(
        connection_string: &str,
        product_count: usize,
        customer_count: usize,
        orders_per_customer: usize,
        lines_per_order: usize,
    ) -> Result<SeedStatus, BenchError> {
        let shape = SeedShape::new(
            product_count,
            customer_count,
            orders_per_customer,
            lines_per_order,
        );
        let context = OrdersContext::connect(connection_string)?;
        let status = Self::ensure_created_with(&context, shape)?;
        context.close()?;
        Ok(status)
    }

    /// Same as [`ensure_created`](Self::ensure_created) on an open context
    ///
    /// # Errors
    ///
    /// Fails on an impossible shape or any database error.
    pub fn ensure_created_with(
        context: &OrdersContext,
        shape: SeedShape,
    ) -> Result<SeedStatus, BenchError> {
        let totals = shape.totals()?;
        let db = context.connection();

        context
            .block_on(OrdersMigrator::up(db, None))
            .map_err(|e| BenchError::database("Failed to create orders schema", e))?;

        if context
            .block_on(current_totals(db))
            .map_err(|e| BenchError::database("Failed to inspect seed data", e))?
            == totals
        {
            tracing::debug!(?shape, "Seed data already present");
            return Ok(SeedStatus::AlreadySeeded);
        }

        tracing::debug!(?shape, "Seeding orders database");
        context
            .block_on(reseed(db, shape))
            .map_err(|e| BenchError::database("Failed to seed orders database", e))?;
        Ok(SeedStatus::Seeded)
    }
}

async fn current_totals(db: &DatabaseConnection) -> Result<(i32, i32, i32, i32), DbErr> {
    // Counts above i32::MAX cannot match any valid shape anyway.
    let clamp = |n: u64| i32::try_from(n).unwrap_or(i32::MAX);
    Ok((
        clamp(product::Entity::find().count(db).await?),
        clamp(customer::Entity::find().count(db).await?),
        clamp(order::Entity::find().count(db).await?),
        clamp(order_line::Entity::find().count(db).await?),
    ))
}

async fn reseed(db: &DatabaseConnection, shape: SeedShape) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    // Children first so foreign keys never dangle
    order_line::Entity::delete_many().exec(&txn).await?;
    order::Entity::delete_many().exec(&txn).await?;
    customer::Entity::delete_many().exec(&txn).await?;
    product::Entity::delete_many().exec(&txn).await?;

    insert_batched::<product::Entity, _>(&txn, products(shape)).await?;
    insert_batched::<customer::Entity, _>(&txn, customers(shape)).await?;
    let (orders, lines) = orders_and_lines(shape);
    insert_batched::<order::Entity, _>(&txn, orders).await?;
    insert_batched::<order_line::Entity, _>(&txn, lines).await?;

    txn.commit().await
}

async fn insert_batched<E, C>(db: &C, rows: Vec<E::ActiveModel>) -> Result<(), DbErr>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    C: ConnectionTrait,
{
    for chunk in rows.chunks(BATCH_SIZE) {
        E::insert_many(chunk.iter().cloned())
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

fn products(shape: SeedShape) -> Vec<product::ActiveModel> {
    let count = i32::try_from(shape.product_count).unwrap_or(i32::MAX);
    (1..=count)
        .map(|id| product::ActiveModel {
            product_id: Set(id),
            name: Set(format!("Product {id}")),
            description: Set(Some(format!("Description of product {id}"))),
            sku: Set(format!("SKU{id:05}")),
            actual_stock_level: Set(id % 50),
            target_stock_level: Set(50),
            retail: Set(f64::from(id) + 0.99),
            current_price: Set(f64::from(id) + 0.49),
        })
        .collect()
}

fn customers(shape: SeedShape) -> Vec<customer::ActiveModel> {
    const TITLES: [&str; 3] = ["Mr", "Ms", "Dr"];
    let count = i32::try_from(shape.customer_count).unwrap_or(i32::MAX);
    (1..=count)
        .map(|id| customer::ActiveModel {
            customer_id: Set(id),
            title: Set(TITLES[usize::try_from(id).unwrap_or(0) % TITLES.len()].to_string()),
            first_name: Set(format!("Customer{id}")),
            last_name: Set(format!("Family{}", id % 20)),
            email: Set(format!("customer{id}@example.com")),
        })
        .collect()
}

fn orders_and_lines(shape: SeedShape) -> (Vec<order::ActiveModel>, Vec<order_line::ActiveModel>) {
    let customers = i32::try_from(shape.customer_count).unwrap_or(i32::MAX);
    let per_customer = i32::try_from(shape.orders_per_customer).unwrap_or(i32::MAX);
    let per_order = i32::try_from(shape.lines_per_order).unwrap_or(i32::MAX);
    let product_count = i32::try_from(shape.product_count).unwrap_or(i32::MAX).max(1);

    let mut orders = Vec::new();
    let mut lines = Vec::new();
    let mut order_id = 0;
    let mut line_id = 0;

    for customer_id in 1..=customers {
        for _ in 0..per_customer {
            order_id += 1;
            let date = DateTime::<Utc>::from_timestamp(
                BASE_ORDER_TIMESTAMP + i64::from(order_id) * SECONDS_PER_DAY,
                0,
            )
            .unwrap_or_default();
            orders.push(order::ActiveModel {
                order_id: Set(order_id),
                customer_id: Set(customer_id),
                date: Set(date),
                special_requests: Set((order_id % 5 == 0).then(|| "Gift wrap".to_string())),
                order_discount: Set(0.0),
                tax: Set(0.1),
                shipping_address: Set(format!("{customer_id} Main Street")),
            });

            for line in 0..per_order {
                line_id += 1;
                let product_id = (line_id - 1) % product_count + 1;
                lines.push(order_line::ActiveModel {
                    order_line_id: Set(line_id),
                    order_id: Set(order_id),
                    product_id: Set(product_id),
                    quantity: Set(line + 1),
                    price: Set(f64::from(product_id) + 0.49),
                    is_subject_to_tax: Set(product_id % 2 == 0),
                    is_shipped: Set(false),
                });
            }
        }
    }

    (orders, lines)
}

use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Iterable, Order, PaginatorTrait,
    PrimaryKeyToColumn, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select, Statement,
};
use std::future::Future;
use tokio::runtime::{Builder, Runtime};

use super::predicate::{Funcletized, Predicate};
use crate::errors::BenchError;
use crate::models::{customer, order, order_line, product};

/// Blocking handle to the orders database.
///
/// Owns a current-thread Tokio runtime and drives every database call to
/// completion on the calling thread. Must not be created from inside an async
/// context.
#[derive(Debug)]
pub struct OrdersContext {
    runtime: Runtime,
    connection: DatabaseConnection,
}

impl OrdersContext {
    /// Open a connection for `connection_string`
    ///
    /// # Errors
    ///
    /// Fails when the runtime cannot be built or the database is unreachable.
    pub fn connect(connection_string: &str) -> Result<Self, BenchError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BenchError::io("tokio runtime", e))?;
        let connection = runtime
            .block_on(Database::connect(connection_string))
            .map_err(|e| BenchError::database("Failed to connect", e))?;
        Ok(Self {
            runtime,
            connection,
        })
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Drive a future on this context's runtime
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Start a query over any entity
    #[must_use]
    pub fn set<E: EntityTrait>(&self) -> Query<'_, E> {
        Query::new(self)
    }

    #[must_use]
    pub fn products(&self) -> Query<'_, product::Entity> {
        self.set()
    }

    #[must_use]
    pub fn customers(&self) -> Query<'_, customer::Entity> {
        self.set()
    }

    #[must_use]
    pub fn orders(&self) -> Query<'_, order::Entity> {
        self.set()
    }

    #[must_use]
    pub fn order_lines(&self) -> Query<'_, order_line::Entity> {
        self.set()
    }

    /// Release the connection, reporting any failure
    ///
    /// # Errors
    ///
    /// Returns the driver error raised while closing.
    pub fn close(mut self) -> Result<(), BenchError> {
        let connection = std::mem::replace(&mut self.connection, DatabaseConnection::Disconnected);
        self.runtime
            .block_on(connection.close())
            .map_err(|e| BenchError::database("Failed to close connection", e))
    }
}

impl Drop for OrdersContext {
    fn drop(&mut self) {
        let connection = std::mem::replace(&mut self.connection, DatabaseConnection::Disconnected);
        if matches!(connection, DatabaseConnection::Disconnected) {
            return;
        }
        if let Err(err) = self.runtime.block_on(connection.close()) {
            tracing::warn!(error = ?err, "Connection was not released cleanly");
        }
    }
}

/// A filtered, ordered view of one entity set.
///
/// Building a query does no work. Every terminal call (`to_list`, `count`,
/// `first`) funcletizes the predicates again and runs a fresh statement.
pub struct Query<'a, E: EntityTrait> {
    context: &'a OrdersContext,
    predicates: Vec<Predicate<'a, E::Column>>,
    ordering: Vec<(E::Column, Order)>,
    limit: Option<u64>,
}

impl<E: EntityTrait> Clone for Query<'_, E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context,
            predicates: self.predicates.clone(),
            ordering: self.ordering.clone(),
            limit: self.limit,
        }
    }
}

impl<'a, E: EntityTrait> Query<'a, E> {
    fn new(context: &'a OrdersContext) -> Self {
        Self {
            context,
            predicates: Vec::new(),
            ordering: Vec::new(),
            limit: None,
        }
    }

    #[must_use]
    pub fn filter(mut self, predicate: Predicate<'a, E::Column>) -> Self {
        self.predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.ordering.push((column, order));
        self
    }

    #[must_use]
    pub fn take(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluate every captured operand and build the concrete condition
    #[must_use]
    pub fn funcletize(&self) -> Funcletized {
        let mut parameters = Vec::new();
        let condition = self
            .predicates
            .iter()
            .fold(sea_orm::Condition::all(), |cond, predicate| {
                cond.add(predicate.funcletize(&mut parameters))
            });
        tracing::trace!(parameters = ?parameters, "Funcletized query");
        Funcletized {
            condition,
            parameters,
        }
    }

    fn select(&self) -> Select<E> {
        let Funcletized { condition, .. } = self.funcletize();
        let mut select = E::find().filter(condition);
        if self.ordering.is_empty() {
            for key in E::PrimaryKey::iter() {
                select = select.order_by_asc(key.into_column());
            }
        } else {
            for (column, order) in &self.ordering {
                select = select.order_by(*column, order.clone());
            }
        }
        if let Some(limit) = self.limit {
            select = select.limit(limit);
        }
        select
    }

    /// SQL this query would run right now, for the context's backend
    #[must_use]
    pub fn statement(&self) -> Statement {
        self.select()
            .build(self.context.connection.get_database_backend())
    }
}

impl<E> Query<'_, E>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    /// Execute and materialize the matching rows in query order
    ///
    /// # Errors
    ///
    /// Returns the database error if the statement fails.
    pub fn to_list(&self) -> Result<Vec<E::Model>, BenchError> {
        let select = self.select();
        self.context
            .block_on(select.all(&self.context.connection))
            .map_err(|e| BenchError::database("Query execution failed", e))
    }

    /// # Errors
    ///
    /// Returns the database error if the statement fails.
    pub fn first(&self) -> Result<Option<E::Model>, BenchError> {
        let select = self.select();
        self.context
            .block_on(select.one(&self.context.connection))
            .map_err(|e| BenchError::database("Query execution failed", e))
    }

    /// Number of matching rows. Ignores `take`.
    ///
    /// # Errors
    ///
    /// Returns the database error if the statement fails.
    pub fn count(&self) -> Result<u64, BenchError> {
        let Funcletized { condition, .. } = self.funcletize();
        self.context
            .block_on(E::find().filter(condition).count(&self.context.connection))
            .map_err(|e| BenchError::database("Count query failed", e))
    }
}

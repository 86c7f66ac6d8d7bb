//! Blocking query layer with captured-value predicates.

pub mod context;
pub mod predicate;

pub use context::{OrdersContext, Query};
pub use predicate::{Comparison, Funcletized, Operand, Predicate};

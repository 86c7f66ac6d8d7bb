//! Orders schema used by the query benchmarks.

pub mod customer;
pub mod migration;
pub mod order;
pub mod order_line;
pub mod product;

pub use migration::OrdersMigrator;

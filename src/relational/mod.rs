//! Relational primitives (joins, aggregation) the assemblers are built from.

pub mod aggregate;
pub mod join;

pub use aggregate::{Sum, group_by_sum};
pub use join::{JoinKey, JoinType, hash_join};

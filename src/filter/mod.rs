//! Row filtering over Arrow record batches.

pub mod core;
pub mod expr;

pub use self::core::{BatchFilter, filter_record_batch};
pub use self::expr::{Expr, ExpressionFilter, evaluate_expr};

//! Expression-based filtering for record batches
//!
//! Expressions follow SQL `WHERE` semantics: a comparison against a null
//! value never matches, so `code <> '99'` drops null codes as well.

use arrow::array::{BooleanArray, StringArray};
use arrow::compute::{and, or};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::core::{BatchFilter, filter_record_batch};
use crate::utils::arrow::array_utils::{downcast_array, get_column_by_name};
use crate::utils::arrow::keys::key_strings;

/// Represents a filter expression over the columns of a record batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Column not equals a value, compared in normalised key form
    NotEq(String, String),

    /// Column is not null
    IsNotNull(String),

    /// String column starts with a prefix
    StartsWith(String, String),

    /// Logical AND of expressions
    And(Vec<Expr>),

    /// Logical OR of expressions
    Or(Vec<Expr>),
}

impl Expr {
    /// `column IS NOT NULL`
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNotNull(column.into())
    }

    /// `column <> value`
    pub fn not_eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotEq(column.into(), value.into())
    }
}

/// Evaluate an expression to a non-null boolean mask over `batch`
pub fn evaluate_expr(batch: &RecordBatch, expr: &Expr) -> Result<BooleanArray> {
    match expr {
        Expr::NotEq(col, value) => {
            // NOT(col = value) AND col IS NOT NULL
            let column = get_column_by_name(batch, col)?;
            Ok(key_strings(&column)?
                .iter()
                .map(|key| Some(key.as_ref().is_some_and(|k| k != value)))
                .collect())
        }
        Expr::IsNotNull(col) => evaluate_is_not_null(batch, col),
        Expr::StartsWith(col, prefix) => {
            let column = get_column_by_name(batch, col)?;
            let strings = downcast_array::<StringArray>(&column, col, "Utf8")?;
            Ok(strings
                .iter()
                .map(|v| Some(v.is_some_and(|s| s.starts_with(prefix.as_str()))))
                .collect())
        }
        Expr::And(exprs) => {
            let mut result = BooleanArray::from(vec![true; batch.num_rows()]);
            for expr in exprs {
                result = and(&result, &evaluate_expr(batch, expr)?)?;
            }
            Ok(result)
        }
        Expr::Or(exprs) => {
            let mut result = BooleanArray::from(vec![false; batch.num_rows()]);
            for expr in exprs {
                result = or(&result, &evaluate_expr(batch, expr)?)?;
            }
            Ok(result)
        }
    }
}

fn evaluate_is_not_null(batch: &RecordBatch, col: &str) -> Result<BooleanArray> {
    let column = get_column_by_name(batch, col)?;
    Ok(arrow::compute::is_not_null(&column)?)
}

/// A filter that evaluates an expression against a record batch
#[derive(Debug, Clone)]
pub struct ExpressionFilter {
    expr: Expr,
}

impl ExpressionFilter {
    /// Create a new expression filter
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }
}

impl BatchFilter for ExpressionFilter {
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = evaluate_expr(batch, &self.expr)?;
        filter_record_batch(batch, &mask)
    }
}

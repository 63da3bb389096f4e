//! Group-by aggregation over record batches.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Int64Array, UInt32Array};
use arrow::compute::{cast, take};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::utils::arrow::array_utils::{downcast_array, get_column_by_name, get_column_index};
use crate::utils::arrow::keys::key_strings;

/// `SUM(column) AS alias`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sum {
    pub column: String,
    pub alias: String,
}

impl Sum {
    pub fn new(column: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            alias: alias.into(),
        }
    }
}

/// Group `batch` by `group_by` and sum integer columns per group
///
/// Groups come out in order of first appearance and null group keys form
/// their own group. Sums skip nulls; a group with only nulls sums to null.
/// Summed columns are cast to `Int64`.
pub fn group_by_sum(batch: &RecordBatch, group_by: &[&str], sums: &[Sum]) -> Result<RecordBatch> {
    let mut key_columns = Vec::with_capacity(group_by.len());
    for name in group_by {
        key_columns.push(key_strings(&get_column_by_name(batch, name)?)?);
    }

    let mut groups: FxHashMap<Vec<Option<String>>, usize> = FxHashMap::default();
    let mut first_rows: Vec<u32> = Vec::new();
    let mut group_of_row: Vec<usize> = Vec::with_capacity(batch.num_rows());

    for row in 0..batch.num_rows() {
        let key: Vec<Option<String>> = key_columns.iter().map(|c| c[row].clone()).collect();
        let next = first_rows.len();
        let group = *groups.entry(key).or_insert_with(|| {
            first_rows.push(row as u32);
            next
        });
        group_of_row.push(group);
    }

    let schema = batch.schema();
    let first_rows = UInt32Array::from(first_rows);
    let mut fields = Vec::with_capacity(group_by.len() + sums.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(group_by.len() + sums.len());

    for name in group_by {
        let idx = get_column_index(batch, name)?;
        fields.push(schema.field(idx).clone());
        columns.push(take(batch.column(idx).as_ref(), &first_rows, None)?);
    }

    for sum in sums {
        let column = cast(&get_column_by_name(batch, &sum.column)?, &DataType::Int64)?;
        let values = downcast_array::<Int64Array>(&column, &sum.column, "Int64")?;

        let mut totals: Vec<Option<i64>> = vec![None; first_rows.len()];
        for (row, &group) in group_of_row.iter().enumerate() {
            if values.is_valid(row) {
                let total = totals[group].get_or_insert(0);
                *total = total.saturating_add(values.value(row));
            }
        }

        fields.push(Field::new(&sum.alias, DataType::Int64, true));
        columns.push(Arc::new(Int64Array::from(totals)));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

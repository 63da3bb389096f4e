//! Utilities for working with Arrow arrays.
//!
//! Column lookup by name, typed downcasts with readable errors, and helpers
//! for rebuilding a batch after one column has been transformed.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{EtlError, Result};

/// Downcast a column to a specific array type with clear error messages
///
/// # Arguments
///
/// * `array` - The array reference to downcast
/// * `column_name` - The name of the column (for error messages)
/// * `expected_type_name` - A human-readable name of the expected type (for error messages)
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        EtlError::schema(format!(
            "column '{column_name}' is not a {expected_type_name} array (found {})",
            array.data_type()
        ))
    })
}

/// Get the column index by name from a record batch
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(column_name)
        .map_err(|_| EtlError::column_not_found(column_name))
}

/// Get a column from a record batch by name
pub fn get_column_by_name(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    let idx = get_column_index(batch, column_name)?;
    Ok(Arc::clone(batch.column(idx)))
}

/// Get a string column from a record batch by name
pub fn get_string_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a StringArray> {
    let idx = get_column_index(batch, column_name)?;
    downcast_array::<StringArray>(batch.column(idx), column_name, "Utf8")
}

/// Replace one column (and its field) in a record batch
///
/// The new field keeps the column name but takes the data type and
/// nullability of `field`.
pub fn replace_column(
    batch: &RecordBatch,
    column_name: &str,
    field: Field,
    column: ArrayRef,
) -> Result<RecordBatch> {
    let idx = get_column_index(batch, column_name)?;
    let schema = batch.schema();

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if i == idx {
                field.clone().with_name(column_name)
            } else {
                f.as_ref().clone()
            }
        })
        .collect();

    let mut columns = batch.columns().to_vec();
    columns[idx] = column;

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Project a batch onto `(source, alias)` column pairs in the given order
///
/// Equivalent to `SELECT source AS alias, ...`.
pub fn select_columns(batch: &RecordBatch, columns: &[(&str, &str)]) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());

    for (source, alias) in columns {
        let idx = get_column_index(batch, source)?;
        fields.push(schema.field(idx).clone().with_name(*alias));
        arrays.push(Arc::clone(batch.column(idx)));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Drop the named columns from a batch; unknown names are ignored
pub fn drop_columns(batch: &RecordBatch, names: &[&str]) -> Result<RecordBatch> {
    let schema = batch.schema();
    let keep: Vec<usize> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !names.contains(&f.name().as_str()))
        .map(|(i, _)| i)
        .collect();

    Ok(batch.project(&keep)?)
}

//! Hash equi-joins over record batches.
//!
//! The right-hand batch is the build side: its key rows are hashed once and
//! the left batch is probed row by row, so output rows follow left order.
//! Right-hand columns come out prefixed with an alias (`ls.code`), which is
//! how the assemblers refer to them in filters and projections.

use std::sync::Arc;

use arrow::array::{ArrayRef, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use log::debug;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{EtlError, Result};
use crate::utils::arrow::array_utils::get_column_by_name;
use crate::utils::arrow::keys::key_strings;

/// Join flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// Only rows with a match on both sides
    Inner,
    /// Every left row; right columns are null where nothing matched
    Left,
}

/// One equality condition `left.column = right.column`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKey {
    pub left: String,
    pub right: String,
    /// Compare `lower(left) = lower(right)`
    pub case_insensitive: bool,
}

impl JoinKey {
    /// Exact equality on the two columns
    pub fn on(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            case_insensitive: false,
        }
    }

    /// Equality of the lower-cased column values
    pub fn lower(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            case_insensitive: true,
        }
    }
}

type CompositeKey = Vec<String>;

/// Composite key of every row; `None` when any component is null
fn row_keys(
    batch: &RecordBatch,
    keys: &[JoinKey],
    side: impl Fn(&JoinKey) -> &str,
) -> Result<Vec<Option<CompositeKey>>> {
    let mut columns = Vec::with_capacity(keys.len());
    for key in keys {
        let column = get_column_by_name(batch, side(key))?;
        columns.push((key_strings(&column)?, key.case_insensitive));
    }

    Ok((0..batch.num_rows())
        .map(|row| {
            columns
                .iter()
                .map(|(values, lower)| {
                    values[row]
                        .as_ref()
                        .map(|v| if *lower { v.to_lowercase() } else { v.clone() })
                })
                .collect::<Option<CompositeKey>>()
        })
        .collect())
}

/// Join `left` to `right` on `keys`
///
/// The output holds every left column followed by every right column
/// renamed to `{right_alias}.{name}`. Null keys never match, as in SQL.
pub fn hash_join(
    left: &RecordBatch,
    right: &RecordBatch,
    keys: &[JoinKey],
    join_type: JoinType,
    right_alias: &str,
) -> Result<RecordBatch> {
    if keys.is_empty() {
        return Err(EtlError::schema("join requires at least one key"));
    }

    let mut table: FxHashMap<CompositeKey, SmallVec<[u32; 1]>> = FxHashMap::default();
    for (row, key) in row_keys(right, keys, |k| k.right.as_str())?
        .into_iter()
        .enumerate()
    {
        if let Some(key) = key {
            table.entry(key).or_default().push(row as u32);
        }
    }

    let mut left_indices: Vec<u32> = Vec::with_capacity(left.num_rows());
    let mut right_indices: Vec<Option<u32>> = Vec::with_capacity(left.num_rows());

    for (row, key) in row_keys(left, keys, |k| k.left.as_str())?
        .iter()
        .enumerate()
    {
        match key.as_ref().and_then(|k| table.get(k)) {
            Some(matches) => {
                for &r in matches {
                    left_indices.push(row as u32);
                    right_indices.push(Some(r));
                }
            }
            None if join_type == JoinType::Left => {
                left_indices.push(row as u32);
                right_indices.push(None);
            }
            None => {}
        }
    }

    debug!(
        "{join_type:?} join with {right_alias}: {} x {} rows -> {}",
        left.num_rows(),
        right.num_rows(),
        left_indices.len()
    );

    let left_take = UInt32Array::from(left_indices);
    let right_take = UInt32Array::from(right_indices);

    let mut fields: Vec<Field> = left
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let mut columns: Vec<ArrayRef> = left
        .columns()
        .iter()
        .map(|c| take(c.as_ref(), &left_take, None))
        .collect::<std::result::Result<_, _>>()?;

    for (field, column) in right.schema().fields().iter().zip(right.columns()) {
        fields.push(
            field
                .as_ref()
                .clone()
                .with_name(format!("{right_alias}.{}", field.name()))
                .with_nullable(field.is_nullable() || join_type == JoinType::Left),
        );
        columns.push(take(column.as_ref(), &right_take, None)?);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

//! Normalised string keys for joins, grouping and partition paths.
//!
//! The immigration source stores SAS numerics as doubles (`i94mode = 1.0`)
//! while the label lookups carry text codes (`'1'`). Every key column is
//! rendered to text the same way so both sides compare equal: strings pass
//! through, integers print in decimal and integral floats drop the
//! fractional part.

use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int8Array, Int16Array, Int32Array, Int64Array,
    LargeStringArray, StringArray, UInt8Array, UInt16Array, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;

use crate::error::{EtlError, Result};

/// Render a float the way integral SAS numerics are written as codes
#[must_use]
pub fn format_float_key(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

macro_rules! collect_keys {
    ($array:expr, $ty:ty, $render:expr) => {{
        let typed = $array
            .as_any()
            .downcast_ref::<$ty>()
            .ok_or_else(|| EtlError::schema("key column downcast failed"))?;
        typed.iter().map(|v| v.map($render)).collect()
    }};
}

/// Render every value of a key column; nulls stay `None`
pub fn key_strings(array: &ArrayRef) -> Result<Vec<Option<String>>> {
    let keys: Vec<Option<String>> = match array.data_type() {
        DataType::Utf8 => collect_keys!(array, StringArray, |v: &str| v.to_string()),
        DataType::LargeUtf8 => collect_keys!(array, LargeStringArray, |v: &str| v.to_string()),
        DataType::Int8 => collect_keys!(array, Int8Array, |v: i8| v.to_string()),
        DataType::Int16 => collect_keys!(array, Int16Array, |v: i16| v.to_string()),
        DataType::Int32 => collect_keys!(array, Int32Array, |v: i32| v.to_string()),
        DataType::Int64 => collect_keys!(array, Int64Array, |v: i64| v.to_string()),
        DataType::UInt8 => collect_keys!(array, UInt8Array, |v: u8| v.to_string()),
        DataType::UInt16 => collect_keys!(array, UInt16Array, |v: u16| v.to_string()),
        DataType::UInt32 => collect_keys!(array, UInt32Array, |v: u32| v.to_string()),
        DataType::UInt64 => collect_keys!(array, UInt64Array, |v: u64| v.to_string()),
        DataType::Float32 => {
            collect_keys!(array, Float32Array, |v: f32| format_float_key(f64::from(v)))
        }
        DataType::Float64 => collect_keys!(array, Float64Array, format_float_key),
        DataType::Null => vec![None; array.len()],
        other => {
            return Err(EtlError::schema(format!(
                "unsupported key column type {other}"
            )));
        }
    };
    Ok(keys)
}

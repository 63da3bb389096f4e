//! Arrow schema definitions for the pipeline tables

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::labels::LabelCategory;

/// Columns the immigration source must provide
pub const IMMIGRATION_COLUMNS: [&str; 18] = [
    "i94yr", "i94mon", "i94addr", "i94visa", "i94mode", "i94port", "i94res", "arrdate", "depdate",
    "i94bir", "occup", "gender", "biryear", "dtaddto", "airline", "admnum", "fltno", "visatype",
];

/// Schema of a parsed label lookup
#[must_use]
pub fn label_schema(category: LabelCategory) -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("code", DataType::Utf8, false),
        Field::new(category.value_column(), DataType::Utf8, false),
    ]))
}

/// Schema of the cleaned port lookup
#[must_use]
pub fn port_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("code", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("state_code", DataType::Utf8, true),
    ]))
}

/// Schema of the city demographics source
///
/// Columns follow the file positionally; the header names are replaced.
#[must_use]
pub fn demographics_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("city", DataType::Utf8, true),
        Field::new("state", DataType::Utf8, true),
        Field::new("median_age", DataType::Float64, true),
        Field::new("male_population", DataType::Int64, true),
        Field::new("female_population", DataType::Int64, true),
        Field::new("total_population", DataType::Int64, true),
        Field::new("number_of_veterans", DataType::Int64, true),
        Field::new("number_of_foreign_born", DataType::Int64, true),
        Field::new("average_household_size", DataType::Float64, true),
        Field::new("state_code", DataType::Utf8, true),
        Field::new("race", DataType::Utf8, true),
        Field::new("count", DataType::Int64, true),
    ]))
}

/// Check that `schema` carries every column in `required`
pub fn require_columns(schema: &Schema, required: &[&str], table: &str) -> crate::Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|name| schema.index_of(name).is_err())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(crate::EtlError::schema(format!(
            "{table} is missing required columns: {}",
            missing.join(", ")
        )))
    }
}

//! Per-dataset cleaning rules.
//!
//! Every cleaner takes one table and returns a new one; none of them
//! depends on another, so they can run in any order.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::compute::kernels::zip::zip;
use arrow::datatypes::{DataType, Field};
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::{BatchFilter, Expr, ExpressionFilter, evaluate_expr};
use crate::schema::port_schema;
use crate::transform::date::sas_date_to_iso;
use crate::utils::arrow::array_utils::{
    downcast_array, get_column_by_name, get_string_column, replace_column,
};

/// State code the label file uses for "All Other Codes"
pub const INVALID_STATE_CODE: &str = "99";

/// Country name prefixes that mark an unusable country entry
pub const INVALID_COUNTRY_PREFIXES: [&str; 3] = ["No Country", "INVALID", "Collapsed"];

/// Replacement for unusable country names
pub const UNKNOWN_COUNTRY: &str = "NA";

/// Drop the catch-all state code
pub fn clean_states(states: &RecordBatch) -> Result<RecordBatch> {
    ExpressionFilter::new(Expr::not_eq("code", INVALID_STATE_CODE)).filter(states)
}

/// Replace invalid country names with `NA`
pub fn clean_countries(countries: &RecordBatch) -> Result<RecordBatch> {
    let invalid = Expr::Or(
        INVALID_COUNTRY_PREFIXES
            .iter()
            .map(|prefix| Expr::StartsWith("country_name".to_string(), (*prefix).to_string()))
            .collect(),
    );
    let mask = evaluate_expr(countries, &invalid)?;
    let names = get_column_by_name(countries, "country_name")?;
    let cleaned = zip(&mask, &StringArray::new_scalar(UNKNOWN_COUNTRY), &names)?;

    replace_column(
        countries,
        "country_name",
        Field::new("country_name", DataType::Utf8, false),
        cleaned,
    )
}

/// Split `port_name` ("City, ST") into `city` and `state_code`
///
/// Only the first comma separates; without one the whole trimmed name is
/// the city and `state_code` is null.
pub fn clean_ports(ports: &RecordBatch) -> Result<RecordBatch> {
    let names = get_string_column(ports, "port_name")?;

    let (cities, states): (Vec<Option<String>>, Vec<Option<String>>) = names
        .iter()
        .map(|name| match name {
            Some(name) => match name.split_once(',') {
                Some((city, state)) => (
                    Some(city.trim().to_string()),
                    Some(state.trim().to_string()),
                ),
                None => (Some(name.trim().to_string()), None),
            },
            None => (None, None),
        })
        .unzip();

    let columns: Vec<ArrayRef> = vec![
        get_column_by_name(ports, "code")?,
        Arc::new(StringArray::from(cities)),
        Arc::new(StringArray::from(states)),
    ];
    Ok(RecordBatch::try_new(port_schema(), columns)?)
}

/// Turn the SAS `arrdate` day offset into an ISO date string
pub fn clean_immigration(immigration: &RecordBatch) -> Result<RecordBatch> {
    let offsets = cast(&get_column_by_name(immigration, "arrdate")?, &DataType::Float64)?;
    let offsets = downcast_array::<Float64Array>(&offsets, "arrdate", "Float64")?;

    let dates: StringArray = offsets
        .iter()
        .map(|offset| offset.and_then(sas_date_to_iso))
        .collect();

    replace_column(
        immigration,
        "arrdate",
        Field::new("arrdate", DataType::Utf8, true),
        Arc::new(dates),
    )
}

/// Drop demographic rows without a state code
pub fn clean_demographics(demographics: &RecordBatch) -> Result<RecordBatch> {
    ExpressionFilter::new(Expr::is_not_null("state_code")).filter(demographics)
}

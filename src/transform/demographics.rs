//! Port demographics dimension assembly.

use arrow::record_batch::RecordBatch;
use log::info;

use crate::error::Result;
use crate::relational::{JoinKey, JoinType, Sum, group_by_sum, hash_join};
use crate::utils::arrow::array_utils::select_columns;

/// Partition column of the written dimension table
pub const PORT_DEMOGRAPHICS_PARTITIONS: &[&str] = &["state_code"];

/// Output columns of the dimension table as (source, name)
pub const PORT_DEMOGRAPHICS_COLUMNS: [(&str, &str); 8] = [
    ("code", "port_code"),
    ("td.city", "city"),
    ("td.state_code", "state_code"),
    ("td.total_male_population", "total_male_population"),
    ("td.total_female_population", "total_female_population"),
    ("td.total_population", "total_population"),
    ("td.number_of_veterans", "number_of_veterans"),
    ("td.number_of_foreign_born", "number_of_foreign_born"),
];

/// Population metrics summed per (city, state_code)
fn population_sums() -> [Sum; 5] {
    [
        Sum::new("male_population", "total_male_population"),
        Sum::new("female_population", "total_female_population"),
        Sum::new("total_population", "total_population"),
        Sum::new("number_of_veterans", "number_of_veterans"),
        Sum::new("number_of_foreign_born", "number_of_foreign_born"),
    ]
}

/// Sum population metrics per physical place
///
/// Demographics carry one row per (city, state, race); summing first keeps
/// the totals from being repeated per race once joined to ports.
pub fn aggregate_demographics(demographics: &RecordBatch) -> Result<RecordBatch> {
    group_by_sum(demographics, &["city", "state_code"], &population_sums())
}

/// Map aggregated demographics onto I94 port codes
///
/// Ports join on `lower(city)` and exact `state_code`; ports without a
/// matching place and places without a port produce no row.
pub fn create_port_demographics_dim_table(
    demographics: &RecordBatch,
    ports: &RecordBatch,
) -> Result<RecordBatch> {
    let aggregated = aggregate_demographics(demographics)?;

    let keys = [
        JoinKey::lower("city", "city"),
        JoinKey::on("state_code", "state_code"),
    ];
    let joined = hash_join(ports, &aggregated, &keys, JoinType::Inner, "td")?;

    info!(
        "Port demographics: {} places matched to {} port rows",
        aggregated.num_rows(),
        joined.num_rows()
    );

    select_columns(&joined, &PORT_DEMOGRAPHICS_COLUMNS)
}

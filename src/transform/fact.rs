//! Immigration fact table assembly.

use arrow::record_batch::RecordBatch;
use log::info;

use crate::error::Result;
use crate::filter::{BatchFilter, Expr, ExpressionFilter};
use crate::relational::{JoinKey, JoinType, hash_join};
use crate::utils::arrow::array_utils::select_columns;

/// The five cleaned lookups the fact table resolves its foreign keys against
#[derive(Debug, Clone)]
pub struct Lookups {
    pub states: RecordBatch,
    pub visas: RecordBatch,
    pub modes: RecordBatch,
    pub ports: RecordBatch,
    pub countries: RecordBatch,
}

/// Output columns of the fact table as (source, name)
pub const FACT_COLUMNS: [(&str, &str); 18] = [
    ("i94yr", "year"),
    ("i94mon", "month"),
    ("lc.code", "residence_country"),
    ("lp.code", "port"),
    ("arrdate", "arrival_date"),
    ("lm.code", "mode"),
    ("ls.code", "state_code"),
    ("depdate", "departure_date"),
    ("i94bir", "age"),
    ("lvt.code", "visa_type_code"),
    ("occup", "occupation"),
    ("gender", "gender"),
    ("biryear", "birth_year"),
    ("dtaddto", "allowed_date"),
    ("airline", "airline"),
    ("admnum", "admission_number"),
    ("fltno", "flight_number"),
    ("visatype", "visa_type"),
];

/// Partition columns of the written fact table
pub const FACT_PARTITIONS: &[&str] = &["year", "month", "state_code"];

/// Join immigration events to every lookup and keep fully resolved rows
///
/// Each foreign key is left-joined to its lookup and the result is filtered
/// on every lookup code being non-null, so a row survives only when all
/// five keys resolve.
pub fn create_immigration_fact_table(
    immigration: &RecordBatch,
    lookups: &Lookups,
) -> Result<RecordBatch> {
    // (immigration column, lookup, alias)
    let foreign_keys = [
        ("i94addr", &lookups.states, "ls"),
        ("i94visa", &lookups.visas, "lvt"),
        ("i94mode", &lookups.modes, "lm"),
        ("i94port", &lookups.ports, "lp"),
        ("i94res", &lookups.countries, "lc"),
    ];

    let mut joined = immigration.clone();
    for (column, lookup, alias) in foreign_keys {
        joined = hash_join(&joined, lookup, &[JoinKey::on(column, "code")], JoinType::Left, alias)?;
    }

    let resolved = Expr::And(
        ["lp", "lc", "lm", "ls", "lvt"]
            .into_iter()
            .map(|alias| Expr::is_not_null(format!("{alias}.code")))
            .collect(),
    );
    let filtered = ExpressionFilter::new(resolved).filter(&joined)?;

    info!(
        "Immigration fact table: {} of {} events resolved every foreign key",
        filtered.num_rows(),
        immigration.num_rows()
    );

    select_columns(&filtered, &FACT_COLUMNS)
}

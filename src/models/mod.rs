//! Row types for the tables that cross a serde boundary.
//!
//! Demographics are parsed row by row from delimited text and converted to
//! Arrow with `serde_arrow`; the dimension rows are read back the same way.

use serde::{Deserialize, Serialize};

/// One (city, state, race) population slice from the demographics file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicRecord {
    pub city: Option<String>,
    pub state: Option<String>,
    pub median_age: Option<f64>,
    pub male_population: Option<i64>,
    pub female_population: Option<i64>,
    pub total_population: Option<i64>,
    pub number_of_veterans: Option<i64>,
    pub number_of_foreign_born: Option<i64>,
    pub average_household_size: Option<f64>,
    pub state_code: Option<String>,
    pub race: Option<String>,
    pub count: Option<i64>,
}

impl DemographicRecord {
    /// Build a record from the positional fields of one data line
    ///
    /// Empty or unparseable fields become `None`.
    #[must_use]
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a str>) -> Self {
        let mut fields = fields.into_iter().map(str::trim);
        let mut next_text = || fields.next().filter(|f| !f.is_empty()).map(str::to_string);
        let city = next_text();
        let state = next_text();
        let median_age = next_text().and_then(|f| f.parse().ok());
        let male_population = next_text().and_then(|f| parse_count(&f));
        let female_population = next_text().and_then(|f| parse_count(&f));
        let total_population = next_text().and_then(|f| parse_count(&f));
        let number_of_veterans = next_text().and_then(|f| parse_count(&f));
        let number_of_foreign_born = next_text().and_then(|f| parse_count(&f));
        let average_household_size = next_text().and_then(|f| f.parse().ok());
        let state_code = next_text();
        let race = next_text();
        let count = next_text().and_then(|f| parse_count(&f));

        Self {
            city,
            state,
            median_age,
            male_population,
            female_population,
            total_population,
            number_of_veterans,
            number_of_foreign_born,
            average_household_size,
            state_code,
            race,
            count,
        }
    }
}

/// Parse a population count; integral decimals such as `"1234.0"` are accepted
fn parse_count(field: &str) -> Option<i64> {
    field.parse::<i64>().ok().or_else(|| {
        field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

/// One row of the port demographics dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDemographics {
    pub port_code: String,
    pub city: Option<String>,
    pub state_code: Option<String>,
    pub total_male_population: Option<i64>,
    pub total_female_population: Option<i64>,
    pub total_population: Option<i64>,
    pub number_of_veterans: Option<i64>,
    pub number_of_foreign_born: Option<i64>,
}

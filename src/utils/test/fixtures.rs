//! Test fixtures
//!
//! In-memory tables and on-disk inputs mirroring the layout of the I94
//! sources: a label description script, SAS-exported immigration events
//! (numeric codes stored as doubles) and the `;`-delimited demographics file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use crate::config::EtlConfig;
use crate::error::Result;
use crate::sink::write_parquet_file;

/// A label description script with all five categories
pub const SAMPLE_LABELS: &str = "\
/* I94CIT & I94RES - This format shows all the valid and invalid codes for processing */
  value i94cntyl
   582 =  'MEXICO Air Sea, and Not Reported (I-94, no land arrivals)'
   236 =  'AFGHANISTAN'
   101 =  'ALBANIA'
   999 =  'No Country Code (999)'
   403 =  'INVALID: AMERICAN SAMOA'
   157 =  'Collapsed into 148'
;

/* I94PORT - This format shows all the valid and invalid codes for processing */
  value $i94prtl
\t'ALC'\t=\t'ALCAN, AK             '
\t'JFK'\t=\t'NEW YORK, NY          '
\t'MIA'\t=\t'MIAMI, FL             '
\t'XXX'\t=\t'NOT REPORTED/UNKNOWN  '
;

/* ARRDATE is the Arrival Date in the USA. It is a SAS date numeric field */

/* I94MODE - There are missing values as well as not reported (9) */
  value i94model
\t1 = 'Air'
\t2 = 'Sea'
\t3 = 'Land'
\t9 = 'Not reported' ;

/* I94ADDR - There is lots of invalid codes in this variable */
  value i94addrl
\t'AL'='ALABAMA'
\t'FL'='FLORIDA'
\t'NY'='NEW YORK'
\t'99'='All Other Codes'
;

/* I94VISA - Visa codes collapsed into three categories:*/
   1 = Business
   2 = Pleasure
   3 = Student
;
";

/// City demographics with two race rows for Miami and one unusable row
pub const SAMPLE_DEMOGRAPHICS: &str = "\
City;State;Median Age;Male Population;Female Population;Total Population;Number of Veterans;Foreign-born;Average Household Size;State Code;Race;Count
Miami;Florida;40.4;100;120;220;10;30;2.5;FL;White;50
Miami;Florida;40.4;150;130;280;5;40;2.5;FL;Hispanic or Latino;70
New York;New York;36.0;1000;1100;2100;50;900;2.7;NY;Asian;300
Nowhere;Unknown;;;;;;;;;;
";

/// One immigration event as exported from SAS
///
/// The default is a resolvable air arrival at JFK on 2016-04-01.
#[derive(Debug, Clone, Serialize)]
pub struct ImmigrationRow {
    pub i94yr: f64,
    pub i94mon: f64,
    pub i94res: Option<f64>,
    pub i94port: Option<String>,
    pub arrdate: Option<f64>,
    pub i94mode: Option<f64>,
    pub i94addr: Option<String>,
    pub depdate: Option<f64>,
    pub i94bir: Option<f64>,
    pub i94visa: Option<f64>,
    pub occup: Option<String>,
    pub biryear: Option<f64>,
    pub dtaddto: Option<String>,
    pub gender: Option<String>,
    pub airline: Option<String>,
    pub admnum: f64,
    pub fltno: Option<String>,
    pub visatype: Option<String>,
}

impl Default for ImmigrationRow {
    fn default() -> Self {
        Self {
            i94yr: 2016.0,
            i94mon: 4.0,
            i94res: Some(236.0),
            i94port: Some("JFK".to_string()),
            arrdate: Some(20545.0),
            i94mode: Some(1.0),
            i94addr: Some("NY".to_string()),
            depdate: Some(20553.0),
            i94bir: Some(30.0),
            i94visa: Some(2.0),
            occup: None,
            biryear: Some(1986.0),
            dtaddto: Some("09302016".to_string()),
            gender: Some("F".to_string()),
            airline: Some("AA".to_string()),
            admnum: 55_425_730_033.0,
            fltno: Some("00104".to_string()),
            visatype: Some("B2".to_string()),
        }
    }
}

fn immigration_fields() -> Vec<FieldRef> {
    let text = ["i94port", "i94addr", "occup", "dtaddto", "gender", "airline", "fltno", "visatype"];
    let columns = [
        "i94yr", "i94mon", "i94res", "i94port", "arrdate", "i94mode", "i94addr", "depdate",
        "i94bir", "i94visa", "occup", "biryear", "dtaddto", "gender", "airline", "admnum",
        "fltno", "visatype",
    ];
    let schema = Schema::new(
        columns
            .iter()
            .map(|name| {
                let data_type = if text.contains(name) {
                    DataType::Utf8
                } else {
                    DataType::Float64
                };
                Field::new(*name, data_type, !matches!(*name, "i94yr" | "i94mon" | "admnum"))
            })
            .collect::<Vec<_>>(),
    );
    schema.fields().iter().cloned().collect()
}

/// Build an immigration batch with SAS-style column types
pub fn immigration_batch(rows: &[ImmigrationRow]) -> Result<RecordBatch> {
    Ok(serde_arrow::to_record_batch(&immigration_fields(), &rows)?)
}

/// Build a two-column lookup batch (`code`, `value_column`)
pub fn label_batch(value_column: &str, rows: &[(&str, &str)]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("code", DataType::Utf8, false),
        Field::new(value_column, DataType::Utf8, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(rows.iter().map(|(code, _)| Some(*code)).collect::<StringArray>()),
        Arc::new(rows.iter().map(|(_, value)| Some(*value)).collect::<StringArray>()),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Write the sample labels, demographics and `rows` under `dir`
///
/// Returns a configuration pointing at them, with outputs under
/// `dir/output` and the progress bar disabled.
pub fn write_sample_inputs(dir: &Path, rows: &[ImmigrationRow]) -> Result<EtlConfig> {
    let labels = dir.join("I94_SAS_Labels_Descriptions.SAS");
    let demographics = dir.join("us-cities-demographics.csv");
    let immigration = dir.join("immigration");

    fs::write(&labels, SAMPLE_LABELS)?;
    fs::write(&demographics, SAMPLE_DEMOGRAPHICS)?;
    write_parquet_file(
        &immigration_batch(rows)?,
        &immigration.join("i94_apr16_sub.parquet"),
    )?;

    let mut config = EtlConfig::new(labels, immigration, demographics, dir.join("output"));
    config.run.show_progress = false;
    Ok(config)
}

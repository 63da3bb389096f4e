//! ETL for the I94 immigration dataset.
//!
//! Reads the SAS label descriptions, the immigration events and the US city
//! demographics, cleans them and writes a star schema of Parquet tables:
//! an immigration fact table, a port demographics dimension and five
//! label lookups.

pub mod config;
pub mod error;
pub mod filter;
pub mod labels;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod relational;
pub mod schema;
pub mod sink;
pub mod transform;
pub mod utils;

// Core types
pub use config::EtlConfig;
pub use error::{EtlError, Result};
pub use pipeline::{OutputSummary, RunSummary, run};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Building blocks
pub use filter::{Expr, ExpressionFilter};
pub use labels::{LabelCategory, LabelTable, parse_labels};
pub use relational::{JoinKey, JoinType, hash_join};
pub use transform::sas_date_to_iso;

//! Cleaning rules and table assembly for the I94 outputs

pub mod clean;
pub mod date;
pub mod demographics;
pub mod fact;

pub use clean::{clean_countries, clean_demographics, clean_immigration, clean_ports, clean_states};
pub use date::{SAS_EPOCH, sas_date_to_iso};
pub use demographics::{
    PORT_DEMOGRAPHICS_PARTITIONS, aggregate_demographics, create_port_demographics_dim_table,
};
pub use fact::{FACT_PARTITIONS, Lookups, create_immigration_fact_table};

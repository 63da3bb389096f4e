//! Test utilities
//!
//! Small in-memory tables and input files shaped like the real I94 sources.

pub mod fixtures;

pub use fixtures::{
    ImmigrationRow, SAMPLE_DEMOGRAPHICS, SAMPLE_LABELS, immigration_batch, label_batch,
    write_sample_inputs,
};

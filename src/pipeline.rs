//! Run orchestration: load, clean, assemble, validate and write.
//!
//! A run is all-or-nothing. Every stage propagates its first error, and the
//! emptiness checks happen before the first output directory is touched.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use arrow::record_batch::RecordBatch;
use indicatif::ParallelProgressIterator;
use log::info;
use rayon::prelude::*;

use crate::config::EtlConfig;
use crate::error::{EtlError, Result};
use crate::labels::{LabelCategory, i94_countries, i94_modes, i94_ports, i94_states, i94_visas};
use crate::loader::{load_demographics, load_immigration, read_label_descriptions};
use crate::sink::write_table;
use crate::transform::{
    FACT_PARTITIONS, Lookups, PORT_DEMOGRAPHICS_PARTITIONS, clean_countries, clean_demographics,
    clean_immigration, clean_ports, clean_states, create_immigration_fact_table,
    create_port_demographics_dim_table,
};
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_stage, log_warning,
};

/// Output name of the immigration fact table
pub const IMMIGRATION_OUTPUT: &str = "immigrations";

/// Output name of the port demographics dimension
pub const PORT_DEMOGRAPHICS_OUTPUT: &str = "port_demographics";

/// Partition columns of the unpartitioned lookup outputs
const NO_PARTITIONS: &[&str] = &[];

/// Rows and files written for one output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSummary {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub files: usize,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub outputs: Vec<OutputSummary>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Summary of the output called `name`
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&OutputSummary> {
        self.outputs.iter().find(|o| o.name == name)
    }

    /// Rows written across every output
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.outputs.iter().map(|o| o.rows).sum()
    }
}

/// Everything a run writes, assembled in memory
#[derive(Debug)]
struct Tables {
    lookups: Lookups,
    fact: RecordBatch,
    port_demographics: RecordBatch,
}

impl Tables {
    /// The seven outputs with their partition columns
    fn outputs(&self) -> [(&'static str, &RecordBatch, &'static [&'static str]); 7] {
        [
            (IMMIGRATION_OUTPUT, &self.fact, FACT_PARTITIONS),
            (
                PORT_DEMOGRAPHICS_OUTPUT,
                &self.port_demographics,
                PORT_DEMOGRAPHICS_PARTITIONS,
            ),
            (LabelCategory::Mode.output_name(), &self.lookups.modes, NO_PARTITIONS),
            (LabelCategory::Visa.output_name(), &self.lookups.visas, NO_PARTITIONS),
            (LabelCategory::State.output_name(), &self.lookups.states, NO_PARTITIONS),
            (LabelCategory::Country.output_name(), &self.lookups.countries, NO_PARTITIONS),
            (LabelCategory::Port.output_name(), &self.lookups.ports, NO_PARTITIONS),
        ]
    }
}

/// Fail (or warn, when tolerated) on a table with no rows
///
/// # Errors
/// [`EtlError::EmptyResult`] when `batch` is empty and `fail_on_empty` is set.
pub fn check_not_empty(batch: &RecordBatch, table: &str, fail_on_empty: bool) -> Result<()> {
    if batch.num_rows() > 0 {
        return Ok(());
    }
    if fail_on_empty {
        return Err(EtlError::EmptyResult {
            table: table.to_string(),
        });
    }
    log_warning(&format!("No rows returned for {table} table, writing it empty"), None);
    Ok(())
}

/// Parse and clean the five label lookups
fn build_lookups(raw_text: &str) -> Result<Lookups> {
    let lookups = Lookups {
        states: clean_states(&i94_states(raw_text)?)?,
        visas: i94_visas(raw_text)?,
        modes: i94_modes(raw_text)?,
        ports: clean_ports(&i94_ports(raw_text)?)?,
        countries: clean_countries(&i94_countries(raw_text)?)?,
    };

    log_stage("labels", "state", lookups.states.num_rows());
    log_stage("labels", "visa_type", lookups.visas.num_rows());
    log_stage("labels", "mode", lookups.modes.num_rows());
    log_stage("labels", "port", lookups.ports.num_rows());
    log_stage("labels", "country", lookups.countries.num_rows());
    Ok(lookups)
}

/// Load every source and assemble the output tables
fn assemble(config: &EtlConfig) -> Result<Tables> {
    let paths = &config.paths;
    let raw_text = read_label_descriptions(&paths.sas_labels_description_file_path)?;
    let lookups = build_lookups(&raw_text)?;

    let (immigration, demographics) = rayon::join(
        || load_immigration(&paths.immigration_data_path),
        || {
            load_demographics(
                &paths.demographic_data_path,
                config.run.demographics_delimiter,
            )
        },
    );
    let immigration = clean_immigration(&immigration?)?;
    let demographics = clean_demographics(&demographics?)?;
    log_stage("clean", "immigration", immigration.num_rows());
    log_stage("clean", "demographics", demographics.num_rows());

    let fact = create_immigration_fact_table(&immigration, &lookups)?;
    let port_demographics = create_port_demographics_dim_table(&demographics, &lookups.ports)?;
    log_stage("assemble", IMMIGRATION_OUTPUT, fact.num_rows());
    log_stage("assemble", PORT_DEMOGRAPHICS_OUTPUT, port_demographics.num_rows());

    Ok(Tables {
        lookups,
        fact,
        port_demographics,
    })
}

/// Write all outputs in parallel under the configured output path
fn write_outputs(config: &EtlConfig, tables: &Tables) -> Result<Vec<OutputSummary>> {
    let outputs = tables.outputs();
    let pb = create_main_progress_bar(
        outputs.len() as u64,
        Some("Writing outputs"),
        config.run.show_progress,
    );

    let summaries = outputs
        .par_iter()
        .progress_with(pb.clone())
        .map(|(name, batch, partition_by)| {
            let path = config.output_dir(name);
            let written = write_table(batch, &path, partition_by)?;
            log_stage("write", name, written.rows);
            Ok(OutputSummary {
                name: (*name).to_string(),
                path,
                rows: written.rows,
                files: written.files,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    finish_progress_bar(&pb, Some("All outputs written"));
    Ok(summaries)
}

fn run_stages(config: &EtlConfig) -> Result<RunSummary> {
    let start = Instant::now();

    let tables = assemble(config)?;
    check_not_empty(&tables.fact, IMMIGRATION_OUTPUT, config.run.fail_on_empty)?;
    check_not_empty(
        &tables.port_demographics,
        PORT_DEMOGRAPHICS_OUTPUT,
        config.run.fail_on_empty,
    )?;

    let outputs = write_outputs(config, &tables)?;
    let summary = RunSummary {
        outputs,
        elapsed: start.elapsed(),
    };
    info!(
        "Run complete: {} rows across {} outputs in {:?}",
        summary.total_rows(),
        summary.outputs.len(),
        summary.elapsed
    );
    Ok(summary)
}

/// Run the whole pipeline on a worker pool sized from the configuration
///
/// # Errors
/// The first error raised by any stage. Nothing is written when loading,
/// assembly or the emptiness checks fail.
pub fn run(config: &EtlConfig) -> Result<RunSummary> {
    let threads = config.run.worker_threads();
    info!("Starting I94 ETL run with {threads} worker threads");
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    pool.install(|| run_stages(config))
}

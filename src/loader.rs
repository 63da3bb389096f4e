//! Source loading for the immigration and demographics tables

use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use csv::ReaderBuilder;
use itertools::Itertools;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;

use crate::error::util::{open_source, read_source_to_string, validate_directory};
use crate::error::{EtlError, Result};
use crate::models::DemographicRecord;
use crate::schema::{IMMIGRATION_COLUMNS, demographics_schema, require_columns};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Read the label description file once for all lookup builders
pub fn read_label_descriptions(path: &Path) -> Result<String> {
    log_operation_start("Reading label descriptions from", path);
    read_source_to_string(path, "label descriptions")
}

/// Read one Parquet file into a single record batch
pub fn read_parquet(path: &Path) -> Result<RecordBatch> {
    let file = open_source(path, "reading parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches: Vec<RecordBatch> = builder
        .build()?
        .collect::<std::result::Result<_, _>>()?;

    Ok(concat_batches(&schema, &batches)?)
}

/// Find all Parquet files in a directory, sorted by name
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    validate_directory(dir, "finding parquet files")?;

    let files = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "parquet"))
        .sorted()
        .collect_vec();

    if files.is_empty() {
        log_warning("No Parquet files found in directory", Some(dir));
    }
    Ok(files)
}

/// Load the immigration events from a Parquet file or a directory of them
///
/// Directory contents are read in parallel and concatenated in file-name
/// order. The result must carry every column the fact table draws from.
pub fn load_immigration(path: &Path) -> Result<RecordBatch> {
    let start = Instant::now();
    log_operation_start("Loading immigration data from", path);

    let batch = if path.is_dir() {
        let files = find_parquet_files(path)?;
        if files.is_empty() {
            return Err(EtlError::unavailable(path, "no parquet files in directory"));
        }
        let batches = files
            .par_iter()
            .map(|file| read_parquet(file))
            .collect::<Result<Vec<_>>>()?;
        concat_batches(&batches[0].schema(), &batches)?
    } else {
        read_parquet(path)?
    };

    require_columns(&batch.schema(), &IMMIGRATION_COLUMNS, "immigration data")?;
    log_operation_complete("loaded", path, batch.num_rows(), Some(start.elapsed()));
    Ok(batch)
}

/// Load the delimited city demographics file
///
/// Columns are taken by position after the header line, so the header
/// names themselves are not relied on.
pub fn load_demographics(path: &Path, delimiter: char) -> Result<RecordBatch> {
    let start = Instant::now();
    log_operation_start("Loading demographics from", path);

    let delimiter = u8::try_from(delimiter).map_err(|_| {
        EtlError::schema(format!("demographics delimiter {delimiter:?} is not a single byte"))
    })?;
    let file = open_source(path, "demographics")?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let records = reader
        .records()
        .map_ok(|record| DemographicRecord::from_fields(record.iter()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let batch = demographics_to_record_batch(&records)?;
    log_operation_complete("loaded", path, batch.num_rows(), Some(start.elapsed()));
    Ok(batch)
}

/// Convert demographic records to a batch with the demographics schema
pub fn demographics_to_record_batch(records: &[DemographicRecord]) -> Result<RecordBatch> {
    let fields: Vec<FieldRef> = demographics_schema().fields().iter().cloned().collect();
    Ok(serde_arrow::to_record_batch(&fields, &records)?)
}

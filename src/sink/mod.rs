//! Parquet sink with overwrite semantics and optional Hive partitioning.
//!
//! An output is a directory. Writing replaces whatever the directory held,
//! then lays out either a single `part-00000.parquet` or one
//! `col=value/.../part-00000.parquet` file per partition, and finally drops
//! an empty `_SUCCESS` marker.

pub mod partition;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::array::UInt32Array;
use arrow::compute::take_record_batch;
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::error::{EtlError, Result};
use crate::utils::arrow::array_utils::{drop_columns, get_column_by_name};
use crate::utils::arrow::keys::key_strings;

pub use partition::{DEFAULT_PARTITION_NAME, escape_partition_value, partition_segment};

/// File name of the single data file in each leaf directory
pub const PART_FILE_NAME: &str = "part-00000.parquet";

/// Marker written once an output directory is complete
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// What a single output write produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows: usize,
    pub files: usize,
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Write one batch to a Parquet file, creating parent directories
pub fn write_parquet_file(batch: &RecordBatch, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(writer_properties()))?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Remove `dir` if present and recreate it empty
fn reset_directory(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!("Overwriting existing output {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Group row indices by their partition directory, in first-seen order
fn partition_rows(batch: &RecordBatch, partition_by: &[&str]) -> Result<Vec<(PathBuf, Vec<u32>)>> {
    let mut key_columns = Vec::with_capacity(partition_by.len());
    for name in partition_by {
        key_columns.push(key_strings(&get_column_by_name(batch, name)?)?);
    }

    let mut index: FxHashMap<PathBuf, usize> = FxHashMap::default();
    let mut groups: Vec<(PathBuf, Vec<u32>)> = Vec::new();

    for row in 0..batch.num_rows() {
        let dir: PathBuf = partition_by
            .iter()
            .zip(&key_columns)
            .map(|(name, keys)| partition_segment(name, keys[row].as_deref()))
            .collect();

        let group = *index.entry(dir.clone()).or_insert_with(|| {
            groups.push((dir, Vec::new()));
            groups.len() - 1
        });
        groups[group].1.push(row as u32);
    }

    Ok(groups)
}

/// Write `batch` to the output directory `dir`, replacing previous contents
///
/// With an empty `partition_by` the batch goes to a single file. Otherwise
/// rows are split by the partition columns, which are left out of the data
/// files since their values live in the directory names. Partitions are
/// written in parallel.
pub fn write_table(batch: &RecordBatch, dir: &Path, partition_by: &[&str]) -> Result<WriteSummary> {
    for name in partition_by {
        if batch.schema().index_of(name).is_err() {
            return Err(EtlError::column_not_found(name));
        }
    }

    reset_directory(dir)?;

    let files = if partition_by.is_empty() {
        write_parquet_file(batch, &dir.join(PART_FILE_NAME))?;
        1
    } else {
        let groups = partition_rows(batch, partition_by)?;
        groups
            .par_iter()
            .map(|(relative, rows)| {
                let indices = UInt32Array::from(rows.clone());
                let part = take_record_batch(batch, &indices)?;
                let part = drop_columns(&part, partition_by)?;
                let path = dir.join(relative).join(PART_FILE_NAME);
                debug!("Writing {} rows to {}", part.num_rows(), path.display());
                write_parquet_file(&part, &path)
            })
            .collect::<Result<Vec<()>>>()?;
        groups.len()
    };

    File::create(dir.join(SUCCESS_MARKER))?;

    Ok(WriteSummary {
        rows: batch.num_rows(),
        files,
    })
}

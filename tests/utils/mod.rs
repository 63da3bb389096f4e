use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::compute::concat_batches;
use i94_etl::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Every Parquet file below `dir`, sorted by path
pub fn parquet_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "parquet") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Read one Parquet file back into a single batch
pub fn read_parquet_file(path: &Path) -> RecordBatch {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap()).unwrap();
    let schema = builder.schema().clone();
    let batches: Vec<RecordBatch> = builder.build().unwrap().map(Result::unwrap).collect();
    concat_batches(&schema, &batches).unwrap()
}

/// Total rows across every Parquet file of one output
pub fn output_rows(dir: &Path) -> usize {
    parquet_files(dir)
        .iter()
        .map(|path| read_parquet_file(path).num_rows())
        .sum()
}

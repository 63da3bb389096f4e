//! Utility functions for error handling
//!
//! Helpers that open pipeline inputs and turn filesystem failures into
//! [`EtlError::SourceUnavailable`] with the offending path attached.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{EtlError, Result};

fn unavailable(path: &Path, purpose: &str, e: io::Error) -> EtlError {
    let reason = match e.kind() {
        io::ErrorKind::PermissionDenied => "permission denied - check file permissions".to_string(),
        io::ErrorKind::NotFound => format!("not found (needed for {purpose})"),
        io::ErrorKind::InvalidData => "contains invalid UTF-8 data - cannot read as text".to_string(),
        _ => format!("failed to read for {purpose}"),
    };
    EtlError::SourceUnavailable {
        path: path.to_path_buf(),
        reason,
        source: Some(e),
    }
}

/// Open an input file
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn open_source(path: &Path, purpose: &str) -> Result<fs::File> {
    if path.is_dir() {
        return Err(EtlError::unavailable(
            path,
            format!("expected a file for {purpose}, found a directory"),
        ));
    }
    fs::File::open(path).map_err(|e| unavailable(path, purpose, e))
}

/// Read an input file to a string
pub fn read_source_to_string(path: &Path, purpose: &str) -> Result<String> {
    if path.is_dir() {
        return Err(EtlError::unavailable(
            path,
            format!("expected a file for {purpose}, found a directory"),
        ));
    }
    fs::read_to_string(path).map_err(|e| unavailable(path, purpose, e))
}

/// Check that a directory exists and can be listed
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.is_dir() {
        return Err(EtlError::unavailable(
            path,
            format!("directory not found (needed for {purpose})"),
        ));
    }
    fs::read_dir(path)
        .map(|_| ())
        .map_err(|e| unavailable(path, purpose, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = read_source_to_string(&missing, "label parsing").unwrap_err();
        match err {
            EtlError::SourceUnavailable { path, source, .. } => {
                assert_eq!(path, missing);
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            open_source(dir.path(), "demographics"),
            Err(EtlError::SourceUnavailable { .. })
        ));
        assert!(validate_directory(dir.path(), "immigration").is_ok());
    }
}

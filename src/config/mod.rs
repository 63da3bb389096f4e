//! Configuration for the ETL run.
//!
//! Settings come from an INI file with a `[PATHS]` section (and an optional
//! `[RUN]` section), overridable through `I94_ETL__<SECTION>__<KEY>`
//! environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{EtlError, Result};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "cp.cfg";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "I94_ETL_CONFIG";

/// Filesystem locations of the pipeline inputs and outputs
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// SAS label description text (`I94_SAS_Labels_Descriptions.SAS`)
    #[serde(alias = "SAS_LABELS_DESCRIPTION_FILE_PATH")]
    pub sas_labels_description_file_path: PathBuf,
    /// Parquet file or directory of Parquet files with immigration events
    #[serde(alias = "IMMIGRATION_DATA_PATH")]
    pub immigration_data_path: PathBuf,
    /// `;`-delimited city demographics file
    #[serde(alias = "DEMOGRAPHIC_DATA_PATH")]
    pub demographic_data_path: PathBuf,
    /// Root directory for all seven outputs
    #[serde(alias = "OUTPUT_PATH")]
    pub output_path: PathBuf,
}

/// Run behaviour switches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Abort the run when the fact or dimension table is empty
    #[serde(alias = "FAIL_ON_EMPTY")]
    pub fail_on_empty: bool,
    /// Worker threads for data-parallel stages
    #[serde(alias = "THREADS")]
    pub threads: Option<usize>,
    /// Draw a progress bar while writing outputs
    #[serde(alias = "SHOW_PROGRESS")]
    pub show_progress: bool,
    /// Field delimiter of the demographics file
    #[serde(alias = "DEMOGRAPHICS_DELIMITER")]
    pub demographics_delimiter: char,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            fail_on_empty: true,
            threads: None,
            show_progress: true,
            demographics_delimiter: ';',
        }
    }
}

impl RunConfig {
    /// Number of worker threads, defaulting to the CPU count
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.threads.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}

/// Settings for one pipeline run, passed by reference into every stage
#[derive(Debug, Clone, Deserialize)]
pub struct EtlConfig {
    #[serde(alias = "PATHS")]
    pub paths: PathsConfig,
    #[serde(default, alias = "RUN")]
    pub run: RunConfig,
}

impl EtlConfig {
    /// Create a configuration from explicit paths with default run settings
    pub fn new(
        labels: impl Into<PathBuf>,
        immigration: impl Into<PathBuf>,
        demographics: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            paths: PathsConfig {
                sas_labels_description_file_path: labels.into(),
                immigration_data_path: immigration.into(),
                demographic_data_path: demographics.into(),
                output_path: output.into(),
            },
            run: RunConfig::default(),
        }
    }

    /// Load settings from an INI file plus environment overrides
    ///
    /// The file may be absent when the environment supplies every path;
    /// otherwise a missing file is reported as unavailable.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini).required(false))
            .add_source(
                Environment::with_prefix("I94_ETL")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize().map_err(|e| {
            if path.is_file() {
                EtlError::from(e)
            } else {
                EtlError::unavailable(path, "configuration file not found")
            }
        })
    }

    /// Resolve the configuration file from `arg`, then `I94_ETL_CONFIG`, then `cp.cfg`
    #[must_use]
    pub fn resolve_path(arg: Option<String>) -> PathBuf {
        arg.or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
    }

    /// Directory of one named output below `output_path`
    #[must_use]
    pub fn output_dir(&self, name: &str) -> PathBuf {
        self.paths.output_path.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_ini_paths_section() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("cp.cfg");
        let mut file = std::fs::File::create(&cfg_path).unwrap();
        writeln!(
            file,
            "[PATHS]\n\
             SAS_LABELS_DESCRIPTION_FILE_PATH=data/labels.SAS\n\
             IMMIGRATION_DATA_PATH=data/immigration\n\
             DEMOGRAPHIC_DATA_PATH=data/us-cities-demographics.csv\n\
             OUTPUT_PATH=out/\n\
             \n\
             [RUN]\n\
             FAIL_ON_EMPTY=false\n\
             THREADS=2"
        )
        .unwrap();

        let config = EtlConfig::load(&cfg_path).unwrap();
        assert_eq!(
            config.paths.sas_labels_description_file_path,
            PathBuf::from("data/labels.SAS")
        );
        assert_eq!(config.output_dir("port"), PathBuf::from("out/port"));
        assert!(!config.run.fail_on_empty);
        assert_eq!(config.run.worker_threads(), 2);
        assert_eq!(config.run.demographics_delimiter, ';');
    }

    #[test]
    fn missing_config_file_is_named_in_the_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("cp.cfg");
        match EtlConfig::load(&missing) {
            Err(EtlError::SourceUnavailable { path, .. }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn explicit_config_uses_defaults() {
        let config = EtlConfig::new("a", "b", "c", "d");
        assert!(config.run.fail_on_empty);
        assert!(config.run.worker_threads() >= 1);
    }
}

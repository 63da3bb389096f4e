use std::fs;

use i94_etl::utils::test::{ImmigrationRow, SAMPLE_LABELS, write_sample_inputs};
use i94_etl::{EtlConfig, EtlError, run};

#[test]
fn missing_label_file_is_unavailable() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_sample_inputs(dir.path(), &[ImmigrationRow::default()])?;
    fs::remove_file(&config.paths.sas_labels_description_file_path)?;

    assert!(matches!(
        run(&config),
        Err(EtlError::SourceUnavailable { .. })
    ));
    Ok(())
}

#[test]
fn label_file_without_a_category_is_not_found() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_sample_inputs(dir.path(), &[ImmigrationRow::default()])?;
    let without_visas = SAMPLE_LABELS.replace("I94VISA", "VISACAT");
    fs::write(&config.paths.sas_labels_description_file_path, without_visas)?;

    assert!(matches!(
        run(&config),
        Err(EtlError::NotFound { marker }) if marker == "I94VISA"
    ));
    Ok(())
}

#[test]
fn immigration_without_required_columns_is_a_schema_error() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_sample_inputs(dir.path(), &[ImmigrationRow::default()])?;

    let labels = config.paths.sas_labels_description_file_path.clone();
    let broken = EtlConfig::new(
        &labels,
        &labels,
        &config.paths.demographic_data_path,
        dir.path().join("out"),
    );

    assert!(run(&broken).is_err());
    Ok(())
}

#[test]
fn config_file_drives_a_run() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let sample = write_sample_inputs(dir.path(), &[ImmigrationRow::default()])?;
    let cfg_path = dir.path().join("cp.cfg");
    fs::write(
        &cfg_path,
        format!(
            "[PATHS]\n\
             SAS_LABELS_DESCRIPTION_FILE_PATH={}\n\
             IMMIGRATION_DATA_PATH={}\n\
             DEMOGRAPHIC_DATA_PATH={}\n\
             OUTPUT_PATH={}\n\
             \n\
             [RUN]\n\
             SHOW_PROGRESS=false\n\
             THREADS=2\n",
            sample.paths.sas_labels_description_file_path.display(),
            sample.paths.immigration_data_path.display(),
            sample.paths.demographic_data_path.display(),
            dir.path().join("from-config").display(),
        ),
    )?;

    let config = EtlConfig::load(&cfg_path)?;
    let summary = run(&config)?;

    assert_eq!(summary.outputs.len(), 7);
    assert!(dir.path().join("from-config").join("port").exists());
    Ok(())
}

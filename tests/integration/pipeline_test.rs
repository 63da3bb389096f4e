use crate::utils::{output_rows, parquet_files, read_parquet_file};
use i94_etl::sink::{PART_FILE_NAME, SUCCESS_MARKER};
use i94_etl::utils::arrow::{get_string_column, key_strings};
use i94_etl::utils::test::{ImmigrationRow, write_sample_inputs};
use i94_etl::{EtlError, run};

fn unresolvable_rows() -> Vec<ImmigrationRow> {
    vec![
        ImmigrationRow {
            i94addr: Some("ZZ".to_string()),
            ..ImmigrationRow::default()
        },
        ImmigrationRow {
            i94port: Some("QQQ".to_string()),
            ..ImmigrationRow::default()
        },
    ]
}

#[test]
fn full_run_writes_star_schema() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut rows = unresolvable_rows();
    rows.push(ImmigrationRow::default());
    let config = write_sample_inputs(dir.path(), &rows)?;

    let summary = run(&config)?;

    let expected = [
        ("immigrations", 1),
        ("port_demographics", 2),
        ("mode", 4),
        ("visa_type", 3),
        ("state", 3),
        ("country", 6),
        ("port", 4),
    ];
    for (name, count) in expected {
        let output = summary.output(name).expect("output summary");
        assert_eq!(output.rows, count, "rows of {name}");
        assert_eq!(output_rows(&output.path), count, "rows on disk for {name}");
        assert!(output.path.join(SUCCESS_MARKER).exists());
    }

    let fact_file = config
        .output_dir("immigrations")
        .join("year=2016")
        .join("month=4")
        .join("state_code=NY")
        .join(PART_FILE_NAME);
    let fact = read_parquet_file(&fact_file);
    assert_eq!(fact.num_columns(), 15);
    assert_eq!(get_string_column(&fact, "arrival_date")?.value(0), "2016-04-01");
    assert_eq!(get_string_column(&fact, "port")?.value(0), "JFK");

    let dims = parquet_files(&config.output_dir("port_demographics"));
    assert_eq!(dims.len(), 2);
    assert!(dims[0].to_string_lossy().contains("state_code=FL"));
    let miami = read_parquet_file(&dims[0]);
    let male = key_strings(miami.column(miami.schema().index_of("total_male_population")?))?;
    assert_eq!(male, vec![Some("250".to_string())]);

    let countries = read_parquet_file(&config.output_dir("country").join(PART_FILE_NAME));
    let names = get_string_column(&countries, "country_name")?;
    assert_eq!(names.iter().filter(|n| *n == Some("NA")).count(), 3);

    Ok(())
}

#[test]
fn rerun_replaces_previous_output() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_sample_inputs(dir.path(), &[ImmigrationRow::default()])?;
    run(&config)?;

    let miami = ImmigrationRow {
        i94addr: Some("FL".to_string()),
        i94port: Some("MIA".to_string()),
        ..ImmigrationRow::default()
    };
    let config = write_sample_inputs(dir.path(), &[miami.clone(), miami])?;
    let summary = run(&config)?;

    let fact_dir = config.output_dir("immigrations").join("year=2016").join("month=4");
    assert!(!fact_dir.join("state_code=NY").exists());
    assert!(fact_dir.join("state_code=FL").join(PART_FILE_NAME).exists());
    assert_eq!(summary.output("immigrations").map(|o| o.rows), Some(2));
    Ok(())
}

#[test]
fn empty_fact_table_aborts_before_writing() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_sample_inputs(dir.path(), &unresolvable_rows())?;

    let result = run(&config);

    assert!(matches!(
        result,
        Err(EtlError::EmptyResult { ref table }) if table == "immigrations"
    ));
    assert!(!config.paths.output_path.exists());
    Ok(())
}

#[test]
fn tolerated_empty_fact_table_still_writes() -> i94_etl::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = write_sample_inputs(dir.path(), &unresolvable_rows())?;
    config.run.fail_on_empty = false;

    let summary = run(&config)?;

    assert_eq!(summary.output("immigrations").map(|o| o.rows), Some(0));
    assert_eq!(summary.output("port_demographics").map(|o| o.rows), Some(2));
    assert!(config.output_dir("immigrations").join(SUCCESS_MARKER).exists());
    Ok(())
}

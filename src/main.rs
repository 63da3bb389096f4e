use anyhow::Context;
use i94_etl::EtlConfig;
use log::info;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = EtlConfig::resolve_path(std::env::args().nth(1));
    info!("Loading configuration from {}", config_path.display());
    let config = EtlConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;

    let summary = i94_etl::run(&config).context("I94 ETL run failed")?;

    for output in &summary.outputs {
        info!(
            "{:<18} {:>10} rows in {:>4} files -> {}",
            output.name,
            output.rows,
            output.files,
            output.path.display()
        );
    }
    info!("Finished in {:?}", summary.elapsed);
    Ok(())
}

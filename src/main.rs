use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use world_maps::PipelineConfig;

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = PipelineConfig::default();
    info!(
        data = %config.data_dir.display(),
        output = %config.output_dir.display(),
        "building maps"
    );

    let report = world_maps::run(&config).context("map pipeline failed")?;

    for summary in &report.outputs {
        println!("Saved {}", summary.path.display());
    }
    if !report.unmatched.is_empty() {
        info!(
            count = report.unmatched.len(),
            "codes without borders were left uncolored"
        );
    }
    Ok(())
}

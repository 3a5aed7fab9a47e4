//! Network RCA Service - Main Entry Point
//!
//! Usage: `rca-service [CONFIG_FILE]`

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let config = ServiceConfig::load(path.as_deref()).context("loading configuration")?;

    init_logging(&config.log_level, config.log_format)?;

    info!("=== Network RCA Service v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("installing Prometheus recorder")?;

    run_server(config, Some(metrics)).await
}

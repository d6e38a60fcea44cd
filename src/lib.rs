pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod pagination;
pub mod services;
pub mod state;
pub mod timestamp;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;

pub async fn run(config: Config) -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&config.general.log_level);

    match cli.command {
        Some(Commands::Init) => cli::cmd_init(),

        Some(Commands::CheckConfig) => cli::cmd_check_config(&config),

        Some(Commands::Serve) | None => {
            config.validate()?;
            let prometheus_handle = install_metrics_recorder(&config)?;
            cli::cmd_serve(config, prometheus_handle).await
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn install_metrics_recorder(config: &Config) -> anyhow::Result<Option<PrometheusHandle>> {
    if !config.observability.metrics_enabled {
        return Ok(None);
    }

    use metrics_exporter_prometheus::PrometheusBuilder;
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");
    Ok(Some(handle))
}

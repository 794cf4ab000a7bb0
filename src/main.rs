//! synthmon Binary Entry Point
//!
//! Loads the configuration, starts one probe scheduler per target and serves
//! the metrics endpoint until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use synthmon::{
    AppConfig, IcmpPinger, MetricsStore, ProbeRunner, SchedulerRegistry, TargetScheduler,
    config::DEFAULT_CONFIG_PATH,
    server::{AppState, create_router},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// synthmon - Synthetic Reachability Monitoring
#[derive(Parser, Debug)]
#[command(name = "synthmon", version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(default_value = DEFAULT_CONFIG_PATH, env = "SYNTHMON_CONFIG")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,synthmon=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("Loading configuration from: {}", cli.config);
    let config = AppConfig::load(&cli.config)?;
    let targets = config.targets();
    let monitoring = &config.monitoring_config;

    tracing::info!(
        targets = targets.len(),
        interval_secs = monitoring.time_interval,
        probes = monitoring.probes,
        packet_count = monitoring.packet_count,
        timeout = %humantime::format_duration(monitoring.timeout),
        "Configuration loaded"
    );

    let pinger = Arc::new(IcmpPinger::new()?);
    let runner = ProbeRunner::from_config(pinger, monitoring);

    let addr = SocketAddr::new(config.server.bind.parse()?, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let store = MetricsStore::new();
    let mut registry = SchedulerRegistry::new();
    for target in targets {
        tracing::info!("Monitoring {}", target);
        registry.spawn(TargetScheduler::new(
            target,
            runner.clone(),
            store.clone(),
            monitoring.interval(),
        ));
    }

    let app = create_router(
        AppState {
            store,
            target_count: registry.len(),
        },
        &config.server.metrics_path,
    );

    tracing::info!(
        "Metrics endpoint listening on: http://{}{}",
        addr,
        config.server.metrics_path
    );
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down target schedulers...");
    if let Err(e) = registry.shutdown().await {
        tracing::error!("Failed to shutdown target schedulers: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}

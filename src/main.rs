use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meteo_dashboard::charts::DashboardLayout;
use meteo_dashboard::config::{Config, Deployment};
use meteo_dashboard::data::HttpSource;
use meteo_dashboard::query;
use meteo_dashboard::render::SnapshotBackend;
use meteo_dashboard::updater::Dashboard;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration first: the deployment picks the log format
    let config = Config::from_env();
    let json_logs = matches!(&config, Ok(c) if c.deployment == Deployment::Prod);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,meteo_dashboard=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting meteo-dashboard...");

    // Fail fast on invalid configuration
    let config = config?;
    let last_hours = query::last_hours_from_url(&config.dashboard_url);
    tracing::info!(
        deployment = ?config.deployment,
        url = %config.dashboard_url,
        charts = ?config.charts,
        interval_secs = config.refresh_interval_seconds,
        last_hours,
        "Configuration loaded"
    );

    let source = HttpSource::from_config(&config)?;
    let backend = SnapshotBackend::new();
    let layout = DashboardLayout::from_config(&config);

    let dashboard = Dashboard::create(layout, last_hours, source, backend.clone());
    for spec in &dashboard.layout().charts {
        tracing::debug!(
            session = %dashboard.session_id(),
            chart = %spec.id,
            container = %spec.container,
            source = %spec.source_path,
            series = spec.series.len(),
            "Chart configured"
        );
    }
    dashboard.initialize().await?;

    shutdown_signal().await;

    dashboard.dispose();
    for snapshot in backend.snapshots() {
        tracing::info!(
            chart = %snapshot.id,
            rows = snapshot.rows,
            reloads = snapshot.reloads,
            last = ?snapshot.last,
            "Final chart state"
        );
    }

    tracing::info!("Dashboard shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}

mod api;
mod middleware;

use std::sync::Arc;

use farmacia_core::{DataUpdateInfo, PharmacyDataset};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = farmacia_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let dataset = PharmacyDataset::new(config.dataset_path.clone(), config.region.clone());
    if !dataset.path().exists() {
        tracing::warn!(
            path = %dataset.path().display(),
            "dataset file not found; data routes will fail until it is present"
        );
    }

    let state = AppState {
        dataset: Arc::new(dataset),
        update_info: DataUpdateInfo::new(config.data_update_date.clone()),
    };
    let app = build_app(state);

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting server");
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

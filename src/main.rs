use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod config;
mod dashboard;
mod match_state;
mod model;
mod predictor;

use config::Config;
use dashboard::AppState;
use model::{LogisticPipeline, WinModel};
use predictor::WinPredictor;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Load the classifier once; every request shares it read-only.
    let mut pipeline = LogisticPipeline::load(&config.model_path)?;
    if config.no_calibration {
        pipeline = pipeline.without_calibration();
        info!("Platt calibration disabled, serving raw model probabilities");
    }
    let model_info = pipeline.info();
    info!(
        "Model loaded from {}: {} v{} ({} coefficients, calibrated: {})",
        config.model_path.display(),
        model_info.name,
        model_info.version,
        model_info.coefficients,
        model_info.calibrated
    );
    if let Some(trained_at) = model_info.trained_at {
        info!("Model trained at {}", trained_at.to_rfc3339());
    }

    if config.logos_dir.is_dir() {
        info!("Serving logos from {}", config.logos_dir.display());
    } else {
        warn!(
            "Logo directory {} not found – team logos will not render",
            config.logos_dir.display()
        );
    }

    let state = AppState {
        predictor: WinPredictor::new(Arc::new(pipeline)),
        model_info,
    };
    let app = dashboard::router(state, &config.logos_dir);
    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Win predictor listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

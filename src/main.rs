//! Vaccine Adverse Event Risk Predictor server

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vaxrisk::{config, create_router, model::ModelArtifacts, AppState, RiskEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let default_filter = if config.is_production() {
        "vaxrisk=info,tower_http=info"
    } else {
        "vaxrisk=debug,tower_http=debug"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Vaccine risk predictor starting...");

    // Load artifacts; nothing is served without them
    let artifacts = match ModelArtifacts::load(&config.model_path, &config.feature_columns_path) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}. Please ensure the model artifacts are present.", e);
            std::process::exit(1);
        }
    };

    let state = AppState {
        engine: RiskEngine::new(artifacts),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from((config.host, config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

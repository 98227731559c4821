//! Credit Default Risk Scoring API
//!
//! Serves a pre-trained risk-classification pipeline with post-hoc
//! explainability endpoints.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     RISKSCORE API                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌───────────────────┐  │
//! │  │  Decoder  │→ │  Prediction  │  │  Explainability   │  │
//! │  │  (table)  │  │  (threshold) │  │  (TreeSHAP)       │  │
//! │  └───────────┘  └──────┬───────┘  └─────────┬─────────┘  │
//! │                        └─────────┬──────────┘            │
//! │                                  ▼                       │
//! │                    ┌──────────────────────────┐          │
//! │                    │  Model State (read-only) │          │
//! │                    │  preprocessor + forest   │          │
//! │                    └──────────────────────────┘          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline artifact is deserialized exactly once at startup; a missing
//! or malformed artifact is fatal. The service never runs without a model.

mod config;
mod constants;
mod error;
mod handlers;
mod logic;
mod models;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
use state::{AppState, ModelState};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskscore_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!(
        "{} starting ({} environment)...",
        constants::APP_NAME,
        config.environment
    );

    // Load the pipeline once; refuse to serve without it.
    let model = ModelState::load(&config.model_path)
        .expect("Failed to load the pipeline artifact");

    let state = AppState {
        model: Arc::new(model),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        .route("/shap_global", post(handlers::explain::shap_global))
        .route("/shap_local", post(handlers::explain::shap_local))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

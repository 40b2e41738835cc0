// rest_api/src/lib.rs

//! HTTP front of the prescription tracker. Every route lives under `/api`;
//! anything else can be served from a built single-page front end.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Error as AnyhowError};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

use rx_lib::{open_storage, PrescriptionService, PrescriptionStorageEngine};

pub mod config;
pub mod error;
pub mod handlers;

pub use crate::config::{load_rest_api_config, RestApiConfig};
pub use crate::error::ApiError;

use crate::handlers::{
    create_prescription_handler, delete_prescription_handler, health_check_handler,
    list_doctors_handler, list_prescriptions_handler, report_filters_handler, report_handler,
    update_prescription_handler,
};

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub service: PrescriptionService,
}

impl AppState {
    pub fn new(storage: Arc<dyn PrescriptionStorageEngine>) -> Self {
        Self {
            service: PrescriptionService::new(storage),
        }
    }
}

/// Builds the application router. With `static_dir` set, unknown paths are
/// served from it, falling back to its `index.html`.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let api = Router::new()
        .route(
            "/prescriptions",
            get(list_prescriptions_handler).post(create_prescription_handler),
        )
        .route(
            "/prescriptions/:id",
            put(update_prescription_handler).delete(delete_prescription_handler),
        )
        .route("/doctors", get(list_doctors_handler))
        .route("/reports", post(report_handler))
        .route("/report-filters", get(report_filters_handler))
        .route("/health", get(health_check_handler));

    let mut app = Router::new().nest("/api", api);
    if let Some(dir) = static_dir {
        info!("Serving front end from {}", dir.display());
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    app.with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// Main function to start the REST API server
pub async fn start_server(
    config: RestApiConfig,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), AnyhowError> {
    let target = config.database_target()?;
    let storage = open_storage(&target)
        .with_context(|| format!("Failed to open record store at {}", target))?;
    info!("Record store ready ({}) at {}", storage.get_type(), target);

    let app = build_router(AppState::new(storage.clone()), config.static_dir.as_deref());

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to address: {}", addr))?;
    info!("REST API server listening on {}", addr);

    let shutdown_signal = async {
        if shutdown_rx.await.is_err() {
            warn!("Shutdown sender dropped; stopping server.");
        } else {
            info!("Received shutdown signal.");
        }
    };

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("REST API server failed to start or run")?;

    storage
        .flush()
        .await
        .context("Failed to flush record store on shutdown")?;
    info!("REST API server stopped.");
    Ok(())
}

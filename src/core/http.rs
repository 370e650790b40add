//! Worker health and metrics endpoints using Axum

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::metrics::Metrics;

pub const SERVICE_NAME: &str = "ratewatch-worker";

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            last_run: None,
            last_error: None,
        }
    }
}

impl HealthStatus {
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.status = "healthy".to_string();
        self.last_run = Some(at);
        self.last_error = None;
    }

    /// A failed run marks the worker degraded until the next success.
    pub fn record_failure(&mut self, at: DateTime<Utc>, error: impl Into<String>) {
        self.status = "degraded".to_string();
        self.last_run = Some(at);
        self.last_error = Some(error.into());
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": SERVICE_NAME,
        "last_run": health.last_run.map(|t| t.to_rfc3339()),
        "last_error": health.last_error,
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state.metrics.export().map_err(|e| {
        error!(error = %e, "Failed to export metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

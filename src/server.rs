// src/server.rs

//! The MediaShare API service
//!
//! Four read-only JSON endpoints: a welcome page at `/`, the health
//! report at `/health`, deployment metadata at `/metadata`, and a
//! readiness gate at `/ready`. This is the process the generated
//! container file packages and the deploy role probes.

use std::time::Instant;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::{Error, Result};

/// Payload served by `/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub hostname: String,
    pub environment: String,
    pub cloud_provider: String,
    pub version: String,
    pub uptime_seconds: f64,
}

/// Shared state behind every handler
#[derive(Clone)]
pub struct AppState {
    config: ServiceConfig,
    hostname: String,
    started: Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());
        AppState {
            config,
            hostname,
            started: Instant::now(),
        }
    }

    fn uptime_seconds(&self) -> f64 {
        round2(self.started.elapsed().as_secs_f64())
    }
}

/// Round to two decimal places, the precision `/health` reports
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Assemble the service router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/metadata", get(metadata))
        .route("/ready", get(ready))
        .fallback(fallback)
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Welcome to MediaShare API",
        "version": state.config.version,
        "health": "/health",
        "metadata": "/metadata",
        "ready": "/ready",
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        hostname: state.hostname.clone(),
        environment: state.config.environment.clone(),
        cloud_provider: state.config.cloud_provider.clone(),
        version: state.config.version.clone(),
        uptime_seconds: state.uptime_seconds(),
    })
}

async fn metadata(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "hostname": state.hostname,
        "environment": state.config.environment,
        "cloud_provider": state.config.cloud_provider,
        "version": state.config.version,
    }))
}

async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

async fn fallback(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not Found", "path": uri.path() })),
    )
}

/// Serve the API on `bind` until interrupted
pub fn run(bind: &str, config: ServiceConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(bind, config))
}

async fn serve(bind: &str, config: ServiceConfig) -> Result<()> {
    let state = AppState::new(config);
    info!(
        version = %state.config.version,
        environment = %state.config.environment,
        cloud_provider = %state.config.cloud_provider,
        "starting MediaShare API"
    );

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_state() -> AppState {
        AppState {
            config: ServiceConfig {
                version: "9.9.9".to_string(),
                environment: "staging".to_string(),
                cloud_provider: "gcp".to_string(),
            },
            hostname: "node-a".to_string(),
            started: Instant::now(),
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.23456), 1.23);
        assert_eq!(round2(0.005), 0.01);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_hostname_is_resolved_at_startup() {
        let state = AppState::new(ServiceConfig::default());
        assert!(!state.hostname.is_empty());
    }

    #[tokio::test]
    async fn test_root_lists_the_other_endpoints() {
        let Json(payload) = root(State(test_state())).await;
        assert_eq!(payload["message"], "Welcome to MediaShare API");
        assert_eq!(payload["version"], "9.9.9");
        assert_eq!(payload["health"], "/health");
        assert_eq!(payload["metadata"], "/metadata");
        assert_eq!(payload["ready"], "/ready");
    }

    #[tokio::test]
    async fn test_health_reports_the_full_contract() {
        let mut state = test_state();
        state.started = Instant::now() - Duration::from_millis(1500);

        let Json(payload) = health(State(state)).await;
        assert_eq!(payload.status, "healthy");
        assert_eq!(payload.hostname, "node-a");
        assert_eq!(payload.environment, "staging");
        assert_eq!(payload.cloud_provider, "gcp");
        assert_eq!(payload.version, "9.9.9");
        assert!(payload.uptime_seconds >= 1.5);
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_metadata_is_the_static_subset() {
        let Json(payload) = metadata(State(test_state())).await;
        assert_eq!(payload["hostname"], "node-a");
        assert_eq!(payload["environment"], "staging");
        assert_eq!(payload["cloud_provider"], "gcp");
        assert_eq!(payload["version"], "9.9.9");
        assert!(payload.get("uptime_seconds").is_none());
    }

    #[tokio::test]
    async fn test_ready_is_static() {
        let Json(payload) = ready().await;
        assert_eq!(payload, json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn test_unknown_path_is_a_json_404() {
        let (status, Json(payload)) = fallback("/nope".parse::<Uri>().unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["error"], "Not Found");
        assert_eq!(payload["path"], "/nope");
    }
}

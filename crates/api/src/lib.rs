//! Network Root-Cause Analysis API Server
//!
//! REST service exposing topology lookup, root-cause analysis, fault
//! simulation and the multi-tenant status board.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use cascade_sim::CascadeFailureSimulator;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use status_board::StatusBoard;
use tokio::sync::RwLock;
use topology::{Registry, TopologyStore};
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

pub mod analysis;
pub mod config;
pub mod error;
pub mod rate_limit;
mod routes;

pub use analysis::{Analyzer, ScopeAnalysis};
pub use config::{LogFormat, ServiceConfig};
pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Per-scope topology cache
    pub store: TopologyStore,
    /// Engine settings applied to every scope
    pub analyzer: Analyzer,
    pub simulator: CascadeFailureSimulator,
    pub board: StatusBoard,
    /// Prometheus exporter; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state from configuration
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            store: TopologyStore::new(Registry::new(&config.data_root)),
            analyzer: Analyzer::new(config.engine.clone(), config.scoring.clone()),
            simulator: CascadeFailureSimulator::default(),
            board: StatusBoard::new(config.board.clone()),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub tenants: Vec<String>,
}

/// Create the application router
pub fn create_router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route(
            "/api/v1/topology/:tenant/:network",
            get(routes::topology::get_topology),
        )
        .route("/api/v1/analyze", post(routes::analyze::post_analyze))
        .route("/api/v1/simulate", post(routes::simulate::post_simulate))
        .route("/api/v1/board", get(routes::board::get_board))
        .route(
            "/api/v1/board/maintenance/:tenant",
            put(routes::board::put_maintenance),
        )
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    let state = state.read().await;
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        tenants: state.store.registry().list_tenants(),
    })
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    let state = state.read().await;
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), ApiError> {
    let level = Level::from_str(level)
        .map_err(|_| ApiError::Config(format!("invalid log level: {}", level)))?;

    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(true)
                .finish(),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .json()
                .with_max_level(level)
                .with_target(true)
                .finish(),
        ),
    };
    result.map_err(|e| ApiError::Config(format!("failed to set tracing subscriber: {}", e)))
}

/// Run the server until it fails
pub async fn run_server(config: ServiceConfig, metrics: Option<PrometheusHandle>) -> anyhow::Result<()> {
    let mut state = AppState::new(&config);
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }

    let governor = rate_limit::create_governor_config(&config.rate_limit)?;
    let app = create_router(Arc::new(RwLock::new(state)))
        .layer(GovernorLayer { config: governor })
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Starting API server on {} (data root {})", config.bind_addr, config.data_root);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let config = ServiceConfig {
            data_root: concat!(env!("CARGO_MANIFEST_DIR"), "/../../fixtures").to_string(),
            ..Default::default()
        };
        create_router(Arc::new(RwLock::new(AppState::new(&config))))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["tenants"], json!(["A", "B"]));
    }

    #[tokio::test]
    async fn test_topology_lookup() {
        let app = app();
        let (status, body) = send(&app, get("/api/v1/topology/A/default")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["node_count"], 10);

        let (status, _) = send(&app, get("/api/v1/topology/A/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analyze_firewall_failover() {
        let request = with_json(
            "POST",
            "/api/v1/analyze",
            json!({
                "tenant": "A",
                "network": "default",
                "alarms": [
                    {"device_id": "FW_01_PRIMARY", "message": "Heartbeat Loss", "severity": "WARNING"}
                ]
            }),
        );
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"]["root_cause_node_id"], "FW_01_PRIMARY");
        assert_eq!(body["verdict"]["sop_key"], "FW_HA_WARNING");
        assert_eq!(body["runbook"]["key"], "FW_HA_WARNING");
        assert_eq!(body["candidates"][0]["band"], "critical");
        assert!(body["analysis_id"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_scope() {
        let request = with_json(
            "POST",
            "/api/v1/analyze",
            json!({"tenant": "../etc", "network": "default", "alarms": []}),
        );
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("tenant"));
    }

    #[tokio::test]
    async fn test_simulate_scenario() {
        let app = app();
        let request = with_json(
            "POST",
            "/api/v1/simulate",
            json!({"tenant": "A", "network": "default", "scenario": "l2_silent_failure"}),
        );
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "l2_silent_failure");
        assert_eq!(body["alarms"].as_array().unwrap().len(), 3);
        assert_eq!(body["alarms"][0]["device_id"], "L2_SW_01");

        let request = with_json(
            "POST",
            "/api/v1/simulate",
            json!({"tenant": "A", "network": "default", "scenario": "meteor"}),
        );
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_simulate_explicit_root() {
        let request = with_json(
            "POST",
            "/api/v1/simulate",
            json!({"tenant": "A", "network": "default", "root_id": "CORE_SW_01", "message": "Power Supply Failed"}),
        );
        let (status, body) = send(&app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["scenario"].is_null());
        assert_eq!(body["alarms"][0]["message"], "Power Supply Failed");
        // core switch plus two access switches and four APs
        assert_eq!(body["alarms"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_board_scan_and_delta() {
        let app = app();
        let (status, body) = send(&app, get("/api/v1/board?scenario=wan_outage&tenant=A")).await;
        assert_eq!(status, StatusCode::OK);
        let degraded = &body["columns"][1];
        assert_eq!(degraded["health"], "degraded");
        assert_eq!(degraded["rows"][0]["summary"]["tenant"], "A");
        assert_eq!(degraded["rows"][0]["summary"]["suspected"], "WAN_ROUTER_01");
        assert_eq!(body["columns"][3]["total"], 1);

        let (_, body) = send(&app, get("/api/v1/board")).await;
        let good = &body["columns"][3];
        assert_eq!(good["total"], 2);
        let row_a = good["rows"]
            .as_array()
            .unwrap()
            .iter()
            .find(|r| r["summary"]["tenant"] == "A")
            .unwrap();
        assert_eq!(row_a["delta"]["alarms"], -10);
        assert_eq!(row_a["prev_health"], "degraded");
    }

    #[tokio::test]
    async fn test_maintenance_flag() {
        let app = app();
        let request = with_json("PUT", "/api/v1/board/maintenance/B", json!({"enabled": true}));
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["maintenance"], true);

        let (_, body) = send(&app, get("/api/v1/board")).await;
        let rows = body["columns"][3]["rows"].as_array().unwrap();
        let row_b = rows.iter().find(|r| r["summary"]["tenant"] == "B").unwrap();
        assert_eq!(row_b["maintenance"], true);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (status, _) = send(&app(), get("/metrics")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

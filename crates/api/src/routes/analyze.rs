//! Root-cause analysis endpoint

use crate::analysis::ScopeAnalysis;
use crate::error::ApiError;
use crate::AppState;
use alarm::Alarm;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Analysis request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub tenant: String,
    pub network: String,
    #[serde(default)]
    pub alarms: Vec<Alarm>,
}

/// Analyze an alarm set against a scope's topology
pub async fn post_analyze(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ScopeAnalysis>, ApiError> {
    let state = state.read().await;
    let analysis = state
        .analyzer
        .analyze_scope(&state.store, &request.tenant, &request.network, &request.alarms)?;
    Ok(Json(analysis))
}

//! Status board endpoints

use crate::analysis::validate_scope_id;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use cascade_sim::Scenario;
use serde::{Deserialize, Serialize};
use status_board::Board;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Board query parameters
#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    /// Fault to inject before scanning
    pub scenario: Option<String>,
    /// Restrict the injected fault to one tenant
    pub tenant: Option<String>,
}

/// Scan every scope and render the board
pub async fn get_board(
    State(state): State<Arc<RwLock<AppState>>>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<Board>, ApiError> {
    let scenario = match query.scenario.as_deref() {
        Some(name) => Scenario::from_name(name)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown scenario: {}", name)))?,
        None => Scenario::Normal,
    };

    let mut guard = state.write().await;
    let state = &mut *guard;

    let mut summaries = Vec::new();
    for tenant in state.store.registry().list_tenants() {
        let injected = query.tenant.as_deref().map_or(true, |t| t == tenant);
        for network in state.store.registry().list_networks(&tenant) {
            let topology = state.store.get(&tenant, &network)?;
            let alarms = if injected {
                scenario.alarms(&state.simulator, &topology)
            } else {
                Vec::new()
            };

            let analysis = state
                .analyzer
                .analyze_scope(&state.store, &tenant, &network, &alarms)?;
            summaries.push(
                state
                    .board
                    .summarize(&tenant, &network, alarms.len(), analysis.suspected()),
            );
        }
    }

    info!("Board scan: {} scopes, scenario {}", summaries.len(), scenario.as_str());
    Ok(Json(state.board.render(summaries)))
}

/// Maintenance flag update
#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    pub enabled: bool,
}

/// Maintenance flag state
#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub tenant: String,
    pub maintenance: bool,
}

/// Set or clear a tenant's maintenance flag
pub async fn put_maintenance(
    State(state): State<Arc<RwLock<AppState>>>,
    Path(tenant): Path<String>,
    Json(request): Json<MaintenanceRequest>,
) -> Result<Json<MaintenanceResponse>, ApiError> {
    validate_scope_id("tenant", &tenant)?;

    let mut state = state.write().await;
    state.board.set_maintenance(&tenant, request.enabled);

    Ok(Json(MaintenanceResponse {
        maintenance: state.board.in_maintenance(&tenant),
        tenant,
    }))
}

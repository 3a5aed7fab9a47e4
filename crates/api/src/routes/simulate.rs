//! Fault simulation endpoint

use crate::analysis::validate_scope_id;
use crate::error::ApiError;
use crate::AppState;
use alarm::Alarm;
use axum::{extract::State, Json};
use cascade_sim::Scenario;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Simulation request: a named scenario or an explicit failing device
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub tenant: String,
    pub network: String,
    pub scenario: Option<String>,
    pub root_id: Option<String>,
    pub message: Option<String>,
}

/// Simulated alarm set
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub tenant: String,
    pub network: String,
    pub scenario: Option<Scenario>,
    pub alarms: Vec<Alarm>,
}

/// Generate the alarms a fault would raise
pub async fn post_simulate(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    validate_scope_id("tenant", &request.tenant)?;
    validate_scope_id("network", &request.network)?;

    let state = state.read().await;
    let topology = state.store.get(&request.tenant, &request.network)?;

    let (scenario, alarms) = match (request.scenario.as_deref(), request.root_id.as_deref()) {
        (Some(name), None) => {
            let scenario = Scenario::from_name(name)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown scenario: {}", name)))?;
            (Some(scenario), scenario.alarms(&state.simulator, &topology))
        }
        (None, Some(root_id)) => (
            None,
            state
                .simulator
                .simulate(&topology, root_id, request.message.as_deref()),
        ),
        _ => {
            return Err(ApiError::BadRequest(
                "exactly one of scenario or root_id is required".to_string(),
            ))
        }
    };

    Ok(Json(SimulateResponse {
        tenant: request.tenant,
        network: request.network,
        scenario,
        alarms,
    }))
}

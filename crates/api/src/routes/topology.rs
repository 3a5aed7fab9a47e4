//! Topology endpoints

use crate::analysis::validate_scope_id;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use topology::Node;

/// Nodes of one scope
#[derive(Debug, Serialize)]
pub struct TopologyResponse {
    pub tenant: String,
    pub network: String,
    pub node_count: usize,
    pub nodes: Vec<Node>,
}

/// Get a scope's topology
pub async fn get_topology(
    State(state): State<Arc<RwLock<AppState>>>,
    Path((tenant, network)): Path<(String, String)>,
) -> Result<Json<TopologyResponse>, ApiError> {
    validate_scope_id("tenant", &tenant)?;
    validate_scope_id("network", &network)?;

    let state = state.read().await;
    if !state.store.paths(&tenant, &network).topology_path.is_file() {
        return Err(ApiError::NotFound(format!("topology {}/{}", tenant, network)));
    }

    let graph = state.store.get(&tenant, &network)?;
    let nodes: Vec<Node> = graph.iter().cloned().collect();

    Ok(Json(TopologyResponse {
        tenant,
        network,
        node_count: nodes.len(),
        nodes,
    }))
}

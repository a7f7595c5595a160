//! GET /api/config: describes the configured knowledge base.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KbConfigResponse {
    pub search_endpoint: String,
    pub knowledge_base_name: String,
    pub indexes: Vec<String>,
}

/// Handler: GET /api/config
pub async fn kb_config(State(state): State<AppState>) -> Json<KbConfigResponse> {
    Json(KbConfigResponse {
        search_endpoint: state.service.endpoint().to_string(),
        knowledge_base_name: state.service.knowledge_base_name().to_string(),
        indexes: state.service.knowledge_sources().to_vec(),
    })
}

//! POST /api/query: asks the knowledge base one question.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use kbquery_query::{Interaction, QueryInput};

use crate::{error_handler::ApiError, state::AppState};

/// Handler: POST /api/query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/api/query \
///   -H 'content-type: application/json' \
///   -d '{"question":"What types of insurance policies does Contoso offer?","retrievalReasoningEffort":"low"}'
/// ```
pub async fn submit_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryInput>, JsonRejection>,
) -> Result<Json<Interaction>, ApiError> {
    let Json(input) = payload?;
    let interaction = state.service.submit(&input).await?;
    Ok(Json(interaction))
}

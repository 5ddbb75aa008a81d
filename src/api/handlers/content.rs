use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::{api::state::AppState, error::Result};

/// GET /api/content/:resource
pub async fn get_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<Value>> {
    let value = state.service_context.content.resource_json(&resource).await?;
    Ok(Json(value))
}

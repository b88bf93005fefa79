use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::hechos;
use crate::state::AppState;

/// DELETE /api/admin/hechos/:id
pub async fn delete(State(state): State<AppState>, Path(id_hecho): Path<i32>) -> ApiResult<Value> {
    hechos::delete(state.pool(), id_hecho).await?;
    Ok(ApiResponse::success(json!({ "id_hecho": id_hecho, "deleted": true })))
}

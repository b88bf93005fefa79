use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::database::models::Objetivo;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::objetivos::{self, ObjetivoRequest};
use crate::state::AppState;

/// POST /api/admin/objetivos - Store the monthly targets of one variable and year
///
/// Input:
/// ```json
/// { "id_empresa": 1, "id_gerencia": 2, "id_variable": 3, "anio": 2024,
///   "valores": { "1": 100.5, "2": 98, "12": null } }
/// ```
pub async fn upsert(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<ObjetivoRequest>, JsonRejection>,
) -> ApiResult<Vec<Objetivo>> {
    let input = json_body(payload)?;
    let rows = objetivos::upsert_year(state.pool(), &session.usuario, input).await?;
    Ok(ApiResponse::success(rows))
}

/// DELETE /api/admin/objetivos/:id
pub async fn delete(State(state): State<AppState>, Path(id_objetivo): Path<i32>) -> ApiResult<Value> {
    objetivos::delete(state.pool(), id_objetivo).await?;
    Ok(ApiResponse::success(json!({ "id_objetivo": id_objetivo, "deleted": true })))
}

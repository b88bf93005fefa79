use axum::extract::{rejection::JsonRejection, Json, Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{Empresa, EmpresaGerencia, Gerencia, Variable};
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::empresas::{self, EmpresaUpdate, NewEmpresa};
use crate::services::gerencias::{self, GerenciaUpdate, NewGerencia};
use crate::services::variables::{self, NewVariable, VariableUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub id_gerencia: i32,
}

/// POST /api/admin/empresas
pub async fn empresa_create(
    State(state): State<AppState>,
    payload: Result<Json<NewEmpresa>, JsonRejection>,
) -> ApiResult<Empresa> {
    let input = json_body(payload)?;
    let empresa = empresas::create(state.pool(), input).await?;
    Ok(ApiResponse::created(empresa))
}

/// PUT /api/admin/empresas/:id
pub async fn empresa_update(
    State(state): State<AppState>,
    Path(id_empresa): Path<i32>,
    payload: Result<Json<EmpresaUpdate>, JsonRejection>,
) -> ApiResult<Empresa> {
    let input = json_body(payload)?;
    let empresa = empresas::update(state.pool(), id_empresa, input).await?;
    Ok(ApiResponse::success(empresa))
}

/// DELETE /api/admin/empresas/:id
pub async fn empresa_delete(State(state): State<AppState>, Path(id_empresa): Path<i32>) -> ApiResult<Value> {
    empresas::delete(state.pool(), id_empresa).await?;
    Ok(ApiResponse::success(json!({ "id_empresa": id_empresa, "deleted": true })))
}

/// POST /api/admin/empresas/:id/gerencias - Link a gerencia to a company
pub async fn empresa_link(
    State(state): State<AppState>,
    Path(id_empresa): Path<i32>,
    payload: Result<Json<LinkRequest>, JsonRejection>,
) -> ApiResult<EmpresaGerencia> {
    let input = json_body(payload)?;
    let link = empresas::link_gerencia(state.pool(), id_empresa, input.id_gerencia).await?;
    Ok(ApiResponse::created(link))
}

/// DELETE /api/admin/empresas/:id/gerencias/:id_gerencia
pub async fn empresa_unlink(
    State(state): State<AppState>,
    Path((id_empresa, id_gerencia)): Path<(i32, i32)>,
) -> ApiResult<Value> {
    empresas::unlink_gerencia(state.pool(), id_empresa, id_gerencia).await?;
    Ok(ApiResponse::success(json!({
        "id_empresa": id_empresa,
        "id_gerencia": id_gerencia,
        "deleted": true
    })))
}

/// POST /api/admin/gerencias
pub async fn gerencia_create(
    State(state): State<AppState>,
    payload: Result<Json<NewGerencia>, JsonRejection>,
) -> ApiResult<Gerencia> {
    let input = json_body(payload)?;
    let gerencia = gerencias::create(state.pool(), input).await?;
    Ok(ApiResponse::created(gerencia))
}

/// PUT /api/admin/gerencias/:id
pub async fn gerencia_update(
    State(state): State<AppState>,
    Path(id_gerencia): Path<i32>,
    payload: Result<Json<GerenciaUpdate>, JsonRejection>,
) -> ApiResult<Gerencia> {
    let input = json_body(payload)?;
    let gerencia = gerencias::update(state.pool(), id_gerencia, input).await?;
    Ok(ApiResponse::success(gerencia))
}

/// DELETE /api/admin/gerencias/:id
pub async fn gerencia_delete(State(state): State<AppState>, Path(id_gerencia): Path<i32>) -> ApiResult<Value> {
    gerencias::delete(state.pool(), id_gerencia).await?;
    Ok(ApiResponse::success(json!({ "id_gerencia": id_gerencia, "deleted": true })))
}

/// POST /api/admin/variables
pub async fn variable_create(
    State(state): State<AppState>,
    payload: Result<Json<NewVariable>, JsonRejection>,
) -> ApiResult<Variable> {
    let input = json_body(payload)?;
    let variable = variables::create(state.pool(), input).await?;
    Ok(ApiResponse::created(variable))
}

/// PUT /api/admin/variables/:id
pub async fn variable_update(
    State(state): State<AppState>,
    Path(id_variable): Path<i32>,
    payload: Result<Json<VariableUpdate>, JsonRejection>,
) -> ApiResult<Variable> {
    let input = json_body(payload)?;
    let variable = variables::update(state.pool(), id_variable, input).await?;
    Ok(ApiResponse::success(variable))
}

/// DELETE /api/admin/variables/:id
pub async fn variable_delete(State(state): State<AppState>, Path(id_variable): Path<i32>) -> ApiResult<Value> {
    variables::delete(state.pool(), id_variable).await?;
    Ok(ApiResponse::success(json!({ "id_variable": id_variable, "deleted": true })))
}

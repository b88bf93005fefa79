use axum::{
    extract::{Path, State},
    Extension,
};

use crate::auth::Session;
use crate::database::models::{Empresa, EmpresaGerencia};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{empresas, scope};
use crate::state::AppState;

/// GET /api/empresas - Companies visible to the caller
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<Empresa>> {
    let filter = scope::empresa_filter(&session, None)?;
    let rows = empresas::list(state.pool(), filter).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/empresas/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id_empresa): Path<i32>,
) -> ApiResult<Empresa> {
    scope::ensure_empresa_access(&session, id_empresa)?;
    let empresa = empresas::get(state.pool(), id_empresa).await?;
    Ok(ApiResponse::success(empresa))
}

/// GET /api/empresas/:id/gerencias - Gerencias operated by a company
pub async fn gerencias(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id_empresa): Path<i32>,
) -> ApiResult<Vec<EmpresaGerencia>> {
    scope::ensure_empresa_access(&session, id_empresa)?;
    empresas::get(state.pool(), id_empresa).await?;
    let rows = empresas::gerencias(state.pool(), id_empresa).await?;
    Ok(ApiResponse::success(rows))
}

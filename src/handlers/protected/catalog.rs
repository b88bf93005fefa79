use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;

use crate::database::models::{Gerencia, Variable};
use crate::handlers::query_params;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{gerencias, variables};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VariablesQuery {
    pub gerencia: Option<i32>,
    #[serde(default)]
    pub todas: bool,
}

/// GET /api/gerencias
pub async fn gerencias_list(State(state): State<AppState>) -> ApiResult<Vec<Gerencia>> {
    let rows = gerencias::list(state.pool()).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/variables?gerencia=&todas=
pub async fn variables_list(
    State(state): State<AppState>,
    query: Result<Query<VariablesQuery>, QueryRejection>,
) -> ApiResult<Vec<Variable>> {
    let query = query_params(query)?;
    let rows = variables::list(state.pool(), query.gerencia, query.todas).await?;
    Ok(ApiResponse::success(rows))
}

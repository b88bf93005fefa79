use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::database::models::Hecho;
use crate::error::ApiError;
use crate::handlers::{json_body, query_params};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::hechos::{self, BatchCaptureRequest, CaptureRequest, HechoFilter, HechoUpdate};
use crate::services::matrix::{self, MatrixRow, MonthlyRow};
use crate::services::scope;
use crate::state::AppState;

/// Query string shared by the monthly listings
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub empresa: Option<i32>,
    pub gerencia: Option<i32>,
    pub anio: Option<i32>,
    pub variable: Option<i32>,
}

impl PeriodQuery {
    pub fn anio(&self) -> Result<i32, ApiError> {
        self.anio
            .ok_or_else(|| ApiError::invalid_field("anio", "Year is required"))
    }
}

/// Matrix payload: one row per variable, one column per month
#[derive(Debug, Serialize)]
pub struct MatrixView {
    pub id_empresa: i32,
    pub id_gerencia: Option<i32>,
    pub anio: i32,
    pub placeholder: &'static str,
    pub filas: Vec<MatrixRow>,
}

/// GET /api/hechos?empresa=&gerencia=&anio=&variable= - Flat monthly values
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Vec<Hecho>> {
    let query = query_params(query)?;
    let filter = HechoFilter {
        id_empresa: scope::empresa_filter(&session, query.empresa)?,
        id_gerencia: query.gerencia,
        anio: query.anio()?,
        id_variable: query.variable,
    };
    let rows = hechos::list(state.pool(), filter).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/hechos/matriz?empresa=&gerencia=&anio= - Monthly values as a variable × month matrix
pub async fn matrix(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<MatrixView> {
    let query = query_params(query)?;
    let id_empresa = scope::resolve_empresa(&session, query.empresa)?;
    let anio = query.anio()?;
    let filter = HechoFilter {
        id_empresa: Some(id_empresa),
        id_gerencia: query.gerencia,
        anio,
        id_variable: query.variable,
    };

    let rows = hechos::list(state.pool(), filter).await?;
    let filas = matrix::build(rows.into_iter().map(MonthlyRow::from));

    Ok(ApiResponse::success(MatrixView {
        id_empresa,
        id_gerencia: query.gerencia,
        anio,
        placeholder: matrix::PLACEHOLDER,
        filas,
    }))
}

/// POST /api/hechos - Capture (insert or replace) one monthly value
pub async fn capture(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<CaptureRequest>, JsonRejection>,
) -> ApiResult<Hecho> {
    let input = json_body(payload)?;
    scope::require_capture(&session)?;
    let id_empresa = scope::resolve_empresa(&session, input.id_empresa)?;

    let hecho = hechos::capture(state.pool(), &session.usuario, id_empresa, input).await?;
    Ok(ApiResponse::created(hecho))
}

/// POST /api/hechos/lote - Capture many values of one gerencia and year
pub async fn capture_batch(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<BatchCaptureRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let input = json_body(payload)?;
    scope::require_capture(&session)?;
    let id_empresa = scope::resolve_empresa(&session, input.id_empresa)?;

    let written = hechos::capture_batch(state.pool(), &session.usuario, id_empresa, input).await?;
    Ok(ApiResponse::success(json!({ "id_empresa": id_empresa, "registros": written })))
}

/// PUT /api/hechos/:id - Correct a captured value
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id_hecho): Path<i32>,
    payload: Result<Json<HechoUpdate>, JsonRejection>,
) -> ApiResult<Hecho> {
    let input = json_body(payload)?;
    scope::require_capture(&session)?;

    let existing = hechos::get(state.pool(), id_hecho).await?;
    scope::ensure_empresa_access(&session, existing.id_empresa)?;

    let hecho = hechos::update(state.pool(), id_hecho, &session.usuario, input).await?;
    Ok(ApiResponse::success(hecho))
}

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension,
};
use serde::Serialize;

use crate::auth::Session;
use crate::database::models::Objetivo;
use crate::handlers::query_params;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::compliance::{self, ComplianceRow};
use crate::services::hechos::{self, HechoFilter};
use crate::services::matrix::{self, MonthlyRow};
use crate::services::objetivos::{self, ObjetivoFilter};
use crate::services::scope;
use crate::state::AppState;

use super::hechos::{MatrixView, PeriodQuery};

#[derive(Debug, Serialize)]
pub struct ComplianceView {
    pub id_empresa: i32,
    pub id_gerencia: Option<i32>,
    pub anio: i32,
    pub filas: Vec<ComplianceRow>,
}

/// GET /api/objetivos?empresa=&gerencia=&anio= - Flat monthly targets
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<Vec<Objetivo>> {
    let query = query_params(query)?;
    let filter = ObjetivoFilter {
        id_empresa: scope::empresa_filter(&session, query.empresa)?,
        id_gerencia: query.gerencia,
        anio: query.anio()?,
    };
    let rows = objetivos::list(state.pool(), filter).await?;
    Ok(ApiResponse::success(rows))
}

/// GET /api/objetivos/matriz - Targets as a variable × month matrix
pub async fn matrix(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<MatrixView> {
    let query = query_params(query)?;
    let id_empresa = scope::resolve_empresa(&session, query.empresa)?;
    let anio = query.anio()?;
    let filter = ObjetivoFilter {
        id_empresa: Some(id_empresa),
        id_gerencia: query.gerencia,
        anio,
    };

    let rows = objetivos::list(state.pool(), filter).await?;
    let filas = matrix::build(rows.into_iter().map(MonthlyRow::from));

    Ok(ApiResponse::success(MatrixView {
        id_empresa,
        id_gerencia: query.gerencia,
        anio,
        placeholder: matrix::PLACEHOLDER,
        filas,
    }))
}

/// GET /api/objetivos/cumplimiento - Actual values against targets
pub async fn compliance(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> ApiResult<ComplianceView> {
    let query = query_params(query)?;
    let id_empresa = scope::resolve_empresa(&session, query.empresa)?;
    let anio = query.anio()?;

    let reales = hechos::list(
        state.pool(),
        HechoFilter {
            id_empresa: Some(id_empresa),
            id_gerencia: query.gerencia,
            anio,
            id_variable: None,
        },
    )
    .await?;
    let metas = objetivos::list(
        state.pool(),
        ObjetivoFilter {
            id_empresa: Some(id_empresa),
            id_gerencia: query.gerencia,
            anio,
        },
    )
    .await?;

    let filas = compliance::build(
        reales.into_iter().map(MonthlyRow::from),
        metas.into_iter().map(MonthlyRow::from),
    );

    Ok(ApiResponse::success(ComplianceView {
        id_empresa,
        id_gerencia: query.gerencia,
        anio,
        filas,
    }))
}

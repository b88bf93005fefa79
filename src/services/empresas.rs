use serde::Deserialize;
use sqlx::PgPool;

use crate::database::models::{Empresa, EmpresaGerencia};
use crate::database::timed;
use crate::error::ApiError;
use crate::services::validate;

#[derive(Debug, Deserialize)]
pub struct NewEmpresa {
    pub nombre_empresa: String,
    pub siglas: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmpresaUpdate {
    pub nombre_empresa: Option<String>,
    pub siglas: Option<String>,
    pub activo: Option<bool>,
}

const COLUMNS: &str = "id_empresa, nombre_empresa, siglas, activo, creado_en";

/// All companies, or only `id_empresa` when given
pub async fn list(pool: &PgPool, id_empresa: Option<i32>) -> Result<Vec<Empresa>, ApiError> {
    let sql = format!(
        "SELECT {} FROM empresa_operadora WHERE ($1::int IS NULL OR id_empresa = $1) ORDER BY nombre_empresa",
        COLUMNS
    );
    let rows = timed(
        "empresas.list",
        sqlx::query_as::<_, Empresa>(&sql).bind(id_empresa).fetch_all(pool),
    )
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id_empresa: i32) -> Result<Empresa, ApiError> {
    let sql = format!("SELECT {} FROM empresa_operadora WHERE id_empresa = $1", COLUMNS);
    timed(
        "empresas.get",
        sqlx::query_as::<_, Empresa>(&sql).bind(id_empresa).fetch_optional(pool),
    )
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Company {} not found", id_empresa)))
}

pub async fn create(pool: &PgPool, input: NewEmpresa) -> Result<Empresa, ApiError> {
    let nombre = validate::name("nombre_empresa", &input.nombre_empresa)?;
    let siglas = validate::optional_bounded("siglas", input.siglas.as_deref(), validate::MAX_SIGLAS_LEN)?;

    let sql = format!(
        "INSERT INTO empresa_operadora (nombre_empresa, siglas) VALUES ($1, $2) RETURNING {}",
        COLUMNS
    );
    let empresa = timed(
        "empresas.create",
        sqlx::query_as::<_, Empresa>(&sql).bind(nombre).bind(siglas).fetch_one(pool),
    )
    .await?;

    tracing::info!("Created company {} ({})", empresa.nombre_empresa, empresa.id_empresa);
    Ok(empresa)
}

pub async fn update(pool: &PgPool, id_empresa: i32, input: EmpresaUpdate) -> Result<Empresa, ApiError> {
    let nombre = input
        .nombre_empresa
        .as_deref()
        .map(|n| validate::name("nombre_empresa", n))
        .transpose()?;
    let siglas = validate::optional_bounded("siglas", input.siglas.as_deref(), validate::MAX_SIGLAS_LEN)?;

    let sql = format!(
        "UPDATE empresa_operadora SET \
            nombre_empresa = COALESCE($2, nombre_empresa), \
            siglas = COALESCE($3, siglas), \
            activo = COALESCE($4, activo) \
         WHERE id_empresa = $1 RETURNING {}",
        COLUMNS
    );
    timed(
        "empresas.update",
        sqlx::query_as::<_, Empresa>(&sql)
            .bind(id_empresa)
            .bind(nombre)
            .bind(siglas)
            .bind(input.activo)
            .fetch_optional(pool),
    )
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Company {} not found", id_empresa)))
}

pub async fn delete(pool: &PgPool, id_empresa: i32) -> Result<(), ApiError> {
    let result = timed(
        "empresas.delete",
        sqlx::query("DELETE FROM empresa_operadora WHERE id_empresa = $1")
            .bind(id_empresa)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Company {} not found", id_empresa)));
    }
    tracing::info!("Deleted company {}", id_empresa);
    Ok(())
}

const LINK_SELECT: &str = "SELECT eg.id_empresa_gerencia, eg.id_empresa, eg.id_gerencia, g.nombre_gerencia \
     FROM empresa_gerencia eg JOIN gerencias g ON g.id_gerencia = eg.id_gerencia";

/// Gerencias linked to a company
pub async fn gerencias(pool: &PgPool, id_empresa: i32) -> Result<Vec<EmpresaGerencia>, ApiError> {
    let sql = format!("{} WHERE eg.id_empresa = $1 ORDER BY g.nombre_gerencia", LINK_SELECT);
    let rows = timed(
        "empresas.gerencias",
        sqlx::query_as::<_, EmpresaGerencia>(&sql).bind(id_empresa).fetch_all(pool),
    )
    .await?;
    Ok(rows)
}

/// The company↔gerencia link, or 404 when the company does not operate that gerencia
pub async fn find_link(pool: &PgPool, id_empresa: i32, id_gerencia: i32) -> Result<EmpresaGerencia, ApiError> {
    let sql = format!("{} WHERE eg.id_empresa = $1 AND eg.id_gerencia = $2", LINK_SELECT);
    timed(
        "empresas.find_link",
        sqlx::query_as::<_, EmpresaGerencia>(&sql)
            .bind(id_empresa)
            .bind(id_gerencia)
            .fetch_optional(pool),
    )
    .await?
    .ok_or_else(|| {
        ApiError::not_found(format!(
            "Gerencia {} is not linked to company {}",
            id_gerencia, id_empresa
        ))
    })
}

pub async fn link_gerencia(pool: &PgPool, id_empresa: i32, id_gerencia: i32) -> Result<EmpresaGerencia, ApiError> {
    timed(
        "empresas.link_gerencia",
        sqlx::query("INSERT INTO empresa_gerencia (id_empresa, id_gerencia) VALUES ($1, $2)")
            .bind(id_empresa)
            .bind(id_gerencia)
            .execute(pool),
    )
    .await?;

    tracing::info!("Linked gerencia {} to company {}", id_gerencia, id_empresa);
    find_link(pool, id_empresa, id_gerencia).await
}

pub async fn unlink_gerencia(pool: &PgPool, id_empresa: i32, id_gerencia: i32) -> Result<(), ApiError> {
    let result = timed(
        "empresas.unlink_gerencia",
        sqlx::query("DELETE FROM empresa_gerencia WHERE id_empresa = $1 AND id_gerencia = $2")
            .bind(id_empresa)
            .bind(id_gerencia)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!(
            "Gerencia {} is not linked to company {}",
            id_gerencia, id_empresa
        )));
    }
    Ok(())
}

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::database::models::Hecho;
use crate::database::timed;
use crate::error::ApiError;
use crate::services::{empresas, validate, variables};

/// Filter shared by the flat listing and the matrix view
#[derive(Debug, Clone, Copy)]
pub struct HechoFilter {
    pub id_empresa: Option<i32>,
    pub id_gerencia: Option<i32>,
    pub anio: i32,
    pub id_variable: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureRequest {
    pub id_empresa: Option<i32>,
    pub id_gerencia: i32,
    pub id_variable: i32,
    pub anio: i32,
    pub mes: i32,
    pub valor: Option<Decimal>,
    pub observacion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchCaptureRequest {
    pub id_empresa: Option<i32>,
    pub id_gerencia: i32,
    pub anio: i32,
    pub valores: Vec<BatchValue>,
}

#[derive(Debug, Deserialize)]
pub struct BatchValue {
    pub id_variable: i32,
    pub mes: i32,
    pub valor: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct HechoUpdate {
    pub valor: Option<Decimal>,
    pub observacion: Option<String>,
}

const SELECT: &str = "SELECT h.id_hecho, eg.id_empresa, eg.id_gerencia, h.id_variable, \
            v.nombre_variable, v.unidad, h.anio, h.mes, h.valor, h.observacion, \
            h.registrado_por, h.registrado_en \
     FROM variables_empresa_gerencia_hechos h \
     JOIN empresa_gerencia eg ON eg.id_empresa_gerencia = h.id_empresa_gerencia \
     JOIN variables v ON v.id_variable = h.id_variable";

const UPSERT: &str = "INSERT INTO variables_empresa_gerencia_hechos \
        (id_empresa_gerencia, id_variable, anio, mes, valor, observacion, registrado_por) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) \
     ON CONFLICT (id_empresa_gerencia, id_variable, anio, mes) DO UPDATE SET \
        valor = EXCLUDED.valor, \
        observacion = EXCLUDED.observacion, \
        registrado_por = EXCLUDED.registrado_por, \
        registrado_en = now() \
     RETURNING id_hecho";

pub async fn list(pool: &PgPool, filter: HechoFilter) -> Result<Vec<Hecho>, ApiError> {
    validate::year(filter.anio)?;

    let sql = format!(
        "{} WHERE h.anio = $1 \
           AND ($2::int IS NULL OR eg.id_empresa = $2) \
           AND ($3::int IS NULL OR eg.id_gerencia = $3) \
           AND ($4::int IS NULL OR h.id_variable = $4) \
         ORDER BY v.nombre_variable, h.id_variable, h.mes",
        SELECT
    );
    let rows = timed(
        "hechos.list",
        sqlx::query_as::<_, Hecho>(&sql)
            .bind(filter.anio)
            .bind(filter.id_empresa)
            .bind(filter.id_gerencia)
            .bind(filter.id_variable)
            .fetch_all(pool),
    )
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id_hecho: i32) -> Result<Hecho, ApiError> {
    let sql = format!("{} WHERE h.id_hecho = $1", SELECT);
    timed(
        "hechos.get",
        sqlx::query_as::<_, Hecho>(&sql).bind(id_hecho).fetch_optional(pool),
    )
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Value {} not found", id_hecho)))
}

/// Insert or replace the value of one variable for one month.
///
/// Checks run link (404), then variable (422), then period and value (400).
pub async fn capture(
    pool: &PgPool,
    registrado_por: &str,
    id_empresa: i32,
    input: CaptureRequest,
) -> Result<Hecho, ApiError> {
    let link = empresas::find_link(pool, id_empresa, input.id_gerencia).await?;
    variables::ensure_in_gerencia(pool, input.id_variable, input.id_gerencia).await?;
    let anio = validate::year(input.anio)?;
    let mes = validate::month(input.mes)?;
    let valor = validate::valor(input.valor)?;

    let id_hecho: i32 = timed(
        "hechos.capture",
        sqlx::query_scalar::<_, i32>(UPSERT)
            .bind(link.id_empresa_gerencia)
            .bind(input.id_variable)
            .bind(anio)
            .bind(mes)
            .bind(valor)
            .bind(validate::optional_text(input.observacion.as_deref()))
            .bind(registrado_por)
            .fetch_one(pool),
    )
    .await?;

    tracing::info!(
        id_empresa,
        id_variable = input.id_variable,
        anio,
        mes,
        usuario = registrado_por,
        "captured monthly value"
    );
    get(pool, id_hecho).await
}

/// Capture many values of one gerencia and year atomically, with the same
/// checks as [`capture`]. Returns the number of rows written.
pub async fn capture_batch(
    pool: &PgPool,
    registrado_por: &str,
    id_empresa: i32,
    input: BatchCaptureRequest,
) -> Result<usize, ApiError> {
    let link = empresas::find_link(pool, id_empresa, input.id_gerencia).await?;
    if input.valores.is_empty() {
        return Ok(0);
    }

    let allowed: HashSet<i32> = variables::list(pool, Some(input.id_gerencia), true)
        .await?
        .into_iter()
        .map(|v| v.id_variable)
        .collect();
    if let Some(stray) = input.valores.iter().find(|v| !allowed.contains(&v.id_variable)) {
        return Err(ApiError::unprocessable_entity(format!(
            "Variable {} does not belong to gerencia {}",
            stray.id_variable, input.id_gerencia
        )));
    }
    let anio = validate::year(input.anio)?;
    let valores = batch_values(&input.valores)?;

    let mut tx = pool.begin().await?;
    for (id_variable, mes, valor) in &valores {
        timed(
            "hechos.capture_batch",
            sqlx::query(UPSERT)
                .bind(link.id_empresa_gerencia)
                .bind(*id_variable)
                .bind(anio)
                .bind(*mes)
                .bind(*valor)
                .bind(None::<String>)
                .bind(registrado_por)
                .execute(&mut *tx),
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        id_empresa,
        id_gerencia = input.id_gerencia,
        anio,
        count = valores.len(),
        usuario = registrado_por,
        "captured monthly values in batch"
    );
    Ok(valores.len())
}

/// Validate batch entries; each variable and month may appear once
pub fn batch_values(valores: &[BatchValue]) -> Result<Vec<(i32, i32, Option<Decimal>)>, ApiError> {
    let mut seen = HashSet::new();
    valores
        .iter()
        .map(|value| {
            let mes = validate::month(value.mes)?;
            if !seen.insert((value.id_variable, mes)) {
                return Err(ApiError::invalid_field(
                    "valores",
                    format!("Variable {} appears more than once for month {}", value.id_variable, mes),
                ));
            }
            Ok((value.id_variable, mes, validate::valor(value.valor)?))
        })
        .collect()
}

pub async fn update(
    pool: &PgPool,
    id_hecho: i32,
    registrado_por: &str,
    input: HechoUpdate,
) -> Result<Hecho, ApiError> {
    let valor = validate::valor(input.valor)?;
    let result = timed(
        "hechos.update",
        sqlx::query(
            "UPDATE variables_empresa_gerencia_hechos \
             SET valor = $2, observacion = $3, registrado_por = $4, registrado_en = now() \
             WHERE id_hecho = $1",
        )
        .bind(id_hecho)
        .bind(valor)
        .bind(validate::optional_text(input.observacion.as_deref()))
        .bind(registrado_por)
        .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Value {} not found", id_hecho)));
    }
    get(pool, id_hecho).await
}

pub async fn delete(pool: &PgPool, id_hecho: i32) -> Result<(), ApiError> {
    let result = timed(
        "hechos.delete",
        sqlx::query("DELETE FROM variables_empresa_gerencia_hechos WHERE id_hecho = $1")
            .bind(id_hecho)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Value {} not found", id_hecho)));
    }
    Ok(())
}

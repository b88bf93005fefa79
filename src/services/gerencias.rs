use serde::Deserialize;
use sqlx::PgPool;

use crate::database::models::Gerencia;
use crate::database::timed;
use crate::error::ApiError;
use crate::services::validate;

#[derive(Debug, Deserialize)]
pub struct NewGerencia {
    pub nombre_gerencia: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GerenciaUpdate {
    pub nombre_gerencia: Option<String>,
    pub descripcion: Option<String>,
}

const COLUMNS: &str = "id_gerencia, nombre_gerencia, descripcion, creado_en";

pub async fn list(pool: &PgPool) -> Result<Vec<Gerencia>, ApiError> {
    let sql = format!("SELECT {} FROM gerencias ORDER BY nombre_gerencia", COLUMNS);
    let rows = timed("gerencias.list", sqlx::query_as::<_, Gerencia>(&sql).fetch_all(pool)).await?;
    Ok(rows)
}

pub async fn create(pool: &PgPool, input: NewGerencia) -> Result<Gerencia, ApiError> {
    let nombre = validate::name("nombre_gerencia", &input.nombre_gerencia)?;
    let descripcion = validate::optional_text(input.descripcion.as_deref());

    let sql = format!(
        "INSERT INTO gerencias (nombre_gerencia, descripcion) VALUES ($1, $2) RETURNING {}",
        COLUMNS
    );
    let gerencia = timed(
        "gerencias.create",
        sqlx::query_as::<_, Gerencia>(&sql).bind(nombre).bind(descripcion).fetch_one(pool),
    )
    .await?;

    tracing::info!("Created gerencia {} ({})", gerencia.nombre_gerencia, gerencia.id_gerencia);
    Ok(gerencia)
}

pub async fn update(pool: &PgPool, id_gerencia: i32, input: GerenciaUpdate) -> Result<Gerencia, ApiError> {
    let nombre = input
        .nombre_gerencia
        .as_deref()
        .map(|n| validate::name("nombre_gerencia", n))
        .transpose()?;
    let descripcion = validate::optional_text(input.descripcion.as_deref());

    let sql = format!(
        "UPDATE gerencias SET \
            nombre_gerencia = COALESCE($2, nombre_gerencia), \
            descripcion = COALESCE($3, descripcion) \
         WHERE id_gerencia = $1 RETURNING {}",
        COLUMNS
    );
    timed(
        "gerencias.update",
        sqlx::query_as::<_, Gerencia>(&sql)
            .bind(id_gerencia)
            .bind(nombre)
            .bind(descripcion)
            .fetch_optional(pool),
    )
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Gerencia {} not found", id_gerencia)))
}

pub async fn delete(pool: &PgPool, id_gerencia: i32) -> Result<(), ApiError> {
    let result = timed(
        "gerencias.delete",
        sqlx::query("DELETE FROM gerencias WHERE id_gerencia = $1")
            .bind(id_gerencia)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Gerencia {} not found", id_gerencia)));
    }
    Ok(())
}

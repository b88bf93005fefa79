use serde::Deserialize;
use sqlx::PgPool;

use crate::database::models::Variable;
use crate::database::timed;
use crate::error::ApiError;
use crate::services::validate;

#[derive(Debug, Deserialize)]
pub struct NewVariable {
    pub id_gerencia: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    pub descripcion: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VariableUpdate {
    pub nombre_variable: Option<String>,
    pub unidad: Option<String>,
    pub descripcion: Option<String>,
    pub activo: Option<bool>,
}

const COLUMNS: &str = "id_variable, id_gerencia, nombre_variable, unidad, descripcion, activo";

/// Variables, optionally of one gerencia; inactive ones only when `todas` is set
pub async fn list(pool: &PgPool, id_gerencia: Option<i32>, todas: bool) -> Result<Vec<Variable>, ApiError> {
    let sql = format!(
        "SELECT {} FROM variables \
         WHERE ($1::int IS NULL OR id_gerencia = $1) AND ($2 OR activo) \
         ORDER BY nombre_variable",
        COLUMNS
    );
    let rows = timed(
        "variables.list",
        sqlx::query_as::<_, Variable>(&sql).bind(id_gerencia).bind(todas).fetch_all(pool),
    )
    .await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id_variable: i32) -> Result<Variable, ApiError> {
    let sql = format!("SELECT {} FROM variables WHERE id_variable = $1", COLUMNS);
    timed(
        "variables.get",
        sqlx::query_as::<_, Variable>(&sql).bind(id_variable).fetch_optional(pool),
    )
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Variable {} not found", id_variable)))
}

/// Check that a variable exists and is measured by `id_gerencia`
pub async fn ensure_in_gerencia(pool: &PgPool, id_variable: i32, id_gerencia: i32) -> Result<Variable, ApiError> {
    let variable = get(pool, id_variable).await?;
    if variable.id_gerencia != id_gerencia {
        return Err(ApiError::unprocessable_entity(format!(
            "Variable {} does not belong to gerencia {}",
            id_variable, id_gerencia
        )));
    }
    Ok(variable)
}

pub async fn create(pool: &PgPool, input: NewVariable) -> Result<Variable, ApiError> {
    let nombre = validate::name("nombre_variable", &input.nombre_variable)?;
    let unidad = validate::optional_bounded("unidad", input.unidad.as_deref(), validate::MAX_UNIDAD_LEN)?;
    let descripcion = validate::optional_text(input.descripcion.as_deref());

    let sql = format!(
        "INSERT INTO variables (id_gerencia, nombre_variable, unidad, descripcion) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        COLUMNS
    );
    let variable = timed(
        "variables.create",
        sqlx::query_as::<_, Variable>(&sql)
            .bind(input.id_gerencia)
            .bind(nombre)
            .bind(unidad)
            .bind(descripcion)
            .fetch_one(pool),
    )
    .await?;

    tracing::info!("Created variable {} ({})", variable.nombre_variable, variable.id_variable);
    Ok(variable)
}

pub async fn update(pool: &PgPool, id_variable: i32, input: VariableUpdate) -> Result<Variable, ApiError> {
    let nombre = input
        .nombre_variable
        .as_deref()
        .map(|n| validate::name("nombre_variable", n))
        .transpose()?;
    let unidad = validate::optional_bounded("unidad", input.unidad.as_deref(), validate::MAX_UNIDAD_LEN)?;

    let sql = format!(
        "UPDATE variables SET \
            nombre_variable = COALESCE($2, nombre_variable), \
            unidad = COALESCE($3, unidad), \
            descripcion = COALESCE($4, descripcion), \
            activo = COALESCE($5, activo) \
         WHERE id_variable = $1 RETURNING {}",
        COLUMNS
    );
    timed(
        "variables.update",
        sqlx::query_as::<_, Variable>(&sql)
            .bind(id_variable)
            .bind(nombre)
            .bind(unidad)
            .bind(validate::optional_text(input.descripcion.as_deref()))
            .bind(input.activo)
            .fetch_optional(pool),
    )
    .await?
    .ok_or_else(|| ApiError::not_found(format!("Variable {} not found", id_variable)))
}

pub async fn delete(pool: &PgPool, id_variable: i32) -> Result<(), ApiError> {
    let result = timed(
        "variables.delete",
        sqlx::query("DELETE FROM variables WHERE id_variable = $1")
            .bind(id_variable)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Variable {} not found", id_variable)));
    }
    Ok(())
}

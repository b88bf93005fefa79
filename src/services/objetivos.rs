use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::database::models::Objetivo;
use crate::database::timed;
use crate::error::ApiError;
use crate::services::{empresas, validate, variables};

#[derive(Debug, Clone, Copy)]
pub struct ObjetivoFilter {
    pub id_empresa: Option<i32>,
    pub id_gerencia: Option<i32>,
    pub anio: i32,
}

/// Monthly targets of one variable for one year, keyed by month number ("1".."12")
#[derive(Debug, Deserialize)]
pub struct ObjetivoRequest {
    pub id_empresa: i32,
    pub id_gerencia: i32,
    pub id_variable: i32,
    pub anio: i32,
    pub valores: BTreeMap<String, Option<Decimal>>,
}

const SELECT: &str = "SELECT o.id_objetivo, eg.id_empresa, eg.id_gerencia, o.id_variable, \
            v.nombre_variable, v.unidad, o.anio, o.mes, o.valor, \
            o.registrado_por, o.registrado_en \
     FROM objetivos_variables_hechos o \
     JOIN empresa_gerencia eg ON eg.id_empresa_gerencia = o.id_empresa_gerencia \
     JOIN variables v ON v.id_variable = o.id_variable";

pub async fn list(pool: &PgPool, filter: ObjetivoFilter) -> Result<Vec<Objetivo>, ApiError> {
    validate::year(filter.anio)?;

    let sql = format!(
        "{} WHERE o.anio = $1 \
           AND ($2::int IS NULL OR eg.id_empresa = $2) \
           AND ($3::int IS NULL OR eg.id_gerencia = $3) \
         ORDER BY v.nombre_variable, o.id_variable, o.mes",
        SELECT
    );
    let rows = timed(
        "objetivos.list",
        sqlx::query_as::<_, Objetivo>(&sql)
            .bind(filter.anio)
            .bind(filter.id_empresa)
            .bind(filter.id_gerencia)
            .fetch_all(pool),
    )
    .await?;
    Ok(rows)
}

/// Parse "1".."12" month keys into a month → value list
pub fn parse_months(valores: &BTreeMap<String, Option<Decimal>>) -> Result<Vec<(i32, Option<Decimal>)>, ApiError> {
    let mut months: Vec<(i32, Option<Decimal>)> = valores
        .iter()
        .map(|(key, valor)| -> Result<(i32, Option<Decimal>), ApiError> {
            let mes = key
                .trim()
                .parse::<i32>()
                .map_err(|_| ApiError::invalid_field("valores", format!("'{}' is not a month number", key)))?;
            Ok((validate::month(mes)?, validate::valor(*valor)?))
        })
        .collect::<Result<_, ApiError>>()?;

    months.sort_by_key(|(mes, _)| *mes);
    if months.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(ApiError::invalid_field("valores", "Each month may appear only once"));
    }
    Ok(months)
}

/// Replace the monthly targets of one variable and year in a single transaction
pub async fn upsert_year(
    pool: &PgPool,
    registrado_por: &str,
    input: ObjetivoRequest,
) -> Result<Vec<Objetivo>, ApiError> {
    let link = empresas::find_link(pool, input.id_empresa, input.id_gerencia).await?;
    variables::ensure_in_gerencia(pool, input.id_variable, input.id_gerencia).await?;
    let anio = validate::year(input.anio)?;
    let months = parse_months(&input.valores)?;

    let mut tx = pool.begin().await?;
    for (mes, valor) in &months {
        timed(
            "objetivos.upsert",
            sqlx::query(
                "INSERT INTO objetivos_variables_hechos \
                    (id_empresa_gerencia, id_variable, anio, mes, valor, registrado_por) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 ON CONFLICT (id_empresa_gerencia, id_variable, anio, mes) DO UPDATE SET \
                    valor = EXCLUDED.valor, \
                    registrado_por = EXCLUDED.registrado_por, \
                    registrado_en = now()",
            )
            .bind(link.id_empresa_gerencia)
            .bind(input.id_variable)
            .bind(anio)
            .bind(*mes)
            .bind(*valor)
            .bind(registrado_por)
            .execute(&mut *tx),
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        id_empresa = input.id_empresa,
        id_variable = input.id_variable,
        anio,
        months = months.len(),
        "stored targets"
    );

    let sql = format!(
        "{} WHERE eg.id_empresa_gerencia = $1 AND o.id_variable = $2 AND o.anio = $3 ORDER BY o.mes",
        SELECT
    );
    let rows = timed(
        "objetivos.reload",
        sqlx::query_as::<_, Objetivo>(&sql)
            .bind(link.id_empresa_gerencia)
            .bind(input.id_variable)
            .bind(anio)
            .fetch_all(pool),
    )
    .await?;
    Ok(rows)
}

pub async fn delete(pool: &PgPool, id_objetivo: i32) -> Result<(), ApiError> {
    let result = timed(
        "objetivos.delete",
        sqlx::query("DELETE FROM objetivos_variables_hechos WHERE id_objetivo = $1")
            .bind(id_objetivo)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Target {} not found", id_objetivo)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_and_orders_month_keys() {
        let mut valores = BTreeMap::new();
        valores.insert("12".to_string(), Some(Decimal::from(5)));
        valores.insert("2".to_string(), None);
        valores.insert("10".to_string(), Some(Decimal::from_str("1.5").unwrap()));
        let months = parse_months(&valores).unwrap();
        let order: Vec<i32> = months.iter().map(|(m, _)| *m).collect();
        assert_eq!(order, vec![2, 10, 12]);
        assert_eq!(months[0].1, None);
    }

    #[test]
    fn rejects_bad_month_keys() {
        let mut valores = BTreeMap::new();
        valores.insert("13".to_string(), None);
        assert_eq!(parse_months(&valores).unwrap_err().status_code(), 400);

        let mut valores = BTreeMap::new();
        valores.insert("enero".to_string(), None);
        assert_eq!(parse_months(&valores).unwrap_err().status_code(), 400);
    }

    #[test]
    fn rejects_values_the_column_cannot_hold() {
        let mut valores = BTreeMap::new();
        valores.insert("3".to_string(), Some(Decimal::from_str("0.00001").unwrap()));
        assert_eq!(parse_months(&valores).unwrap_err().status_code(), 400);

        let mut valores = BTreeMap::new();
        valores.insert("3".to_string(), Some(Decimal::from_str("1000000000000000").unwrap()));
        assert!(parse_months(&valores).is_err());
    }

    #[test]
    fn rejects_duplicate_months_after_normalising() {
        let mut valores = BTreeMap::new();
        valores.insert("1".to_string(), None);
        valores.insert("01".to_string(), None);
        assert!(parse_months(&valores).is_err());
    }
}

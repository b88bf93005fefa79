use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Objetivo {
    pub id_objetivo: i32,
    pub id_empresa: i32,
    pub id_gerencia: i32,
    pub id_variable: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    pub anio: i32,
    pub mes: i32,
    pub valor: Option<Decimal>,
    pub registrado_por: String,
    pub registrado_en: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One captured monthly value, joined with its variable and company context
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hecho {
    pub id_hecho: i32,
    pub id_empresa: i32,
    pub id_gerencia: i32,
    pub id_variable: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    pub anio: i32,
    pub mes: i32,
    pub valor: Option<Decimal>,
    pub observacion: Option<String>,
    pub registrado_por: String,
    pub registrado_en: DateTime<Utc>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Empresa {
    pub id_empresa: i32,
    pub nombre_empresa: String,
    pub siglas: Option<String>,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
}

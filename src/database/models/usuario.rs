use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id_usuario: i32,
    pub usuario: String,
    #[serde(skip_serializing)]
    pub clave_hash: String,
    pub nombre: String,
    pub rol: String,
    pub id_empresa: Option<i32>,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
}

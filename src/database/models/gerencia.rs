use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gerencia {
    pub id_gerencia: i32,
    pub nombre_gerencia: String,
    pub descripcion: Option<String>,
    pub creado_en: DateTime<Utc>,
}

/// A gerencia as seen through one company's link row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmpresaGerencia {
    pub id_empresa_gerencia: i32,
    pub id_empresa: i32,
    pub id_gerencia: i32,
    pub nombre_gerencia: String,
}

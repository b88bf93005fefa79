use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Variable {
    pub id_variable: i32,
    pub id_gerencia: i32,
    pub nombre_variable: String,
    pub unidad: Option<String>,
    pub descripcion: Option<String>,
    pub activo: bool,
}

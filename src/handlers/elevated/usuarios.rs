use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::auth::Session;
use crate::database::models::Usuario;
use crate::handlers::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::usuarios::{self, NewUsuario, UsuarioUpdate};
use crate::state::AppState;

/// GET /api/admin/usuarios
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Usuario>> {
    let rows = usuarios::list(state.pool()).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/admin/usuarios
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewUsuario>, JsonRejection>,
) -> ApiResult<Usuario> {
    let input = json_body(payload)?;
    let user = usuarios::create(state.pool(), input).await?;
    Ok(ApiResponse::created(user))
}

/// PUT /api/admin/usuarios/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id_usuario): Path<i32>,
    payload: Result<Json<UsuarioUpdate>, JsonRejection>,
) -> ApiResult<Usuario> {
    let input = json_body(payload)?;
    usuarios::check_self_change(session.id_usuario, id_usuario, &input)?;
    let user = usuarios::update(state.pool(), id_usuario, input).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/admin/usuarios/:id - Deactivate an account
pub async fn delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id_usuario): Path<i32>,
) -> ApiResult<Value> {
    let deactivation = UsuarioUpdate {
        activo: Some(false),
        ..Default::default()
    };
    usuarios::check_self_change(session.id_usuario, id_usuario, &deactivation)?;
    usuarios::deactivate(state.pool(), id_usuario).await?;
    Ok(ApiResponse::success(json!({ "id_usuario": id_usuario, "activo": false })))
}

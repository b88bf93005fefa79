use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{self, cookie, Session};
use crate::config;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::middleware::ApiResponse;
use crate::services::usuarios;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub usuario: String,
    pub clave: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: Session,
    pub expires_in: i64,
}

/// POST /auth/login - Check credentials and open a session
///
/// Input: `{ "usuario": "string", "clave": "string" }`
///
/// On success the session is set as an HttpOnly cookie and also returned in the
/// body, for clients that keep it in localStorage and send it as a Bearer token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = json_body(payload)?;
    if input.usuario.trim().is_empty() || input.clave.is_empty() {
        return Err(ApiError::bad_request("usuario and clave are required"));
    }

    let user = usuarios::authenticate(state.pool(), &input.usuario, &input.clave).await?;
    let rol = usuarios::role_of(&user)?;

    let security = &config::config().security;
    let session = Session::for_user(&user, rol, security.session_expiry_hours);
    let token = auth::issue_token(&session)?;
    let expires_in = session.expires_in();
    let set_cookie = cookie::session_cookie(security, &token, expires_in);

    tracing::info!("User '{}' signed in as {}", session.usuario, session.rol);

    Ok((
        [(header::SET_COOKIE, set_cookie)],
        ApiResponse::success(LoginResponse {
            token,
            session,
            expires_in,
        }),
    )
        .into_response())
}

/// POST /auth/logout - Clear the session cookie
pub async fn logout() -> Response {
    let clear = cookie::clear_cookie(&config::config().security);
    (
        [(header::SET_COOKIE, clear)],
        ApiResponse::success(json!({ "message": "Signed out" })),
    )
        .into_response()
}

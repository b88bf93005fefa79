use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{self, cookie, Session};
use crate::config;
use crate::error::ApiError;
use crate::services::{scope, usuarios};
use crate::state::AppState;

/// Decode the session cookie (or Bearer token) and make the `Session` available to handlers
pub async fn require_session_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = cookie::extract_token(request.headers(), &config::config().security.cookie_name)?;
    let session = auth::verify_token(&token)?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Gate for the elevated tier. Runs after `require_session_middleware`.
pub async fn require_admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let session = session_of(&request)?;
    if let Err(e) = scope::require_admin(session) {
        tracing::warn!("User '{}' ({}) denied admin route {}", session.usuario, session.rol, request.uri().path());
        return Err(e);
    }
    Ok(next.run(request).await)
}

/// Re-check the session against the user table: the account must still be
/// active, with the same role and company it had when the session was issued.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = session_of(&request)?;

    let user = usuarios::find(state.pool(), session.id_usuario).await?.ok_or_else(|| {
        tracing::warn!("User validation failed: user {} no longer exists", session.id_usuario);
        ApiError::forbidden("User is not active")
    })?;

    if !user.activo {
        tracing::warn!("User validation failed: user '{}' is inactive", user.usuario);
        return Err(ApiError::forbidden("User is not active"));
    }

    if user.rol != session.rol.as_str() || user.id_empresa != session.id_empresa {
        tracing::warn!(
            "User validation failed: session of '{}' is out of date (role {} -> {})",
            user.usuario,
            session.rol,
            user.rol
        );
        return Err(ApiError::forbidden("Session is out of date, please sign in again"));
    }

    tracing::debug!("User validation successful: {} ({})", user.usuario, user.rol);
    Ok(next.run(request).await)
}

fn session_of(request: &Request) -> Result<&Session, ApiError> {
    request
        .extensions()
        .get::<Session>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

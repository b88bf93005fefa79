use axum::Extension;

use crate::auth::Session;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth/session - The current session's claims
pub async fn current(Extension(session): Extension<Session>) -> ApiResult<Session> {
    Ok(ApiResponse::success(session))
}

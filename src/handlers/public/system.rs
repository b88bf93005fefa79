use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::Database;
use crate::state::AppState;

/// GET / - Service name, version and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "SIGIA API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Monthly operational indicators and annual targets for water-utility companies",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/login, /auth/logout (public - session acquisition)",
                "session": "/api/auth/session (session)",
                "empresas": "/api/empresas[/:id[/gerencias]] (session, company-scoped)",
                "catalog": "/api/gerencias, /api/variables (session)",
                "hechos": "/api/hechos[/matriz|/lote|/:id] (session, company-scoped)",
                "objetivos": "/api/objetivos[/matriz|/cumplimiento] (session, company-scoped)",
                "admin": "/api/admin/* (admin session)",
            }
        }
    }))
}

/// GET /health - Liveness plus database connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match Database::health_check(state.pool()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}

//! Router construction and the HTTP server loop.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{self, AppConfig};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{
    request_id::REQUEST_ID_HEADER, request_id_middleware, require_admin_middleware, require_session_middleware,
    validate_user_middleware,
};
use crate::state::AppState;

/// Build the complete application router
pub fn app(state: AppState) -> Router {
    let cfg = config::config();

    Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(public_auth_routes())
        // Session-protected API
        .merge(protected_routes(state.clone()))
        // Admin-only API
        .merge(elevated_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(cfg.api.max_request_size_bytes))
        .layer(cors_layer(cfg))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn public_auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{catalog, empresas, hechos, objetivos, session};

    Router::new()
        .route("/api/auth/session", get(session::current))
        // Companies visible to the caller
        .route("/api/empresas", get(empresas::list))
        .route("/api/empresas/:id", get(empresas::get))
        .route("/api/empresas/:id/gerencias", get(empresas::gerencias))
        // Catalog
        .route("/api/gerencias", get(catalog::gerencias_list))
        .route("/api/variables", get(catalog::variables_list))
        // Monthly values
        .route("/api/hechos", get(hechos::list).post(hechos::capture))
        .route("/api/hechos/matriz", get(hechos::matrix))
        .route("/api/hechos/lote", post(hechos::capture_batch))
        .route("/api/hechos/:id", put(hechos::update))
        // Targets
        .route("/api/objetivos", get(objetivos::list))
        .route("/api/objetivos/matriz", get(objetivos::matrix))
        .route("/api/objetivos/cumplimiento", get(objetivos::compliance))
        // Layers run bottom-up: session first, then the user re-check
        .route_layer(from_fn_with_state(state, validate_user_middleware))
        .route_layer(from_fn(require_session_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::{catalog, hechos, objetivos, usuarios};

    Router::new()
        .route("/api/admin/empresas", post(catalog::empresa_create))
        .route(
            "/api/admin/empresas/:id",
            put(catalog::empresa_update).delete(catalog::empresa_delete),
        )
        .route("/api/admin/empresas/:id/gerencias", post(catalog::empresa_link))
        .route(
            "/api/admin/empresas/:id/gerencias/:id_gerencia",
            delete(catalog::empresa_unlink),
        )
        .route("/api/admin/gerencias", post(catalog::gerencia_create))
        .route(
            "/api/admin/gerencias/:id",
            put(catalog::gerencia_update).delete(catalog::gerencia_delete),
        )
        .route("/api/admin/variables", post(catalog::variable_create))
        .route(
            "/api/admin/variables/:id",
            put(catalog::variable_update).delete(catalog::variable_delete),
        )
        .route("/api/admin/hechos/:id", delete(hechos::delete))
        .route("/api/admin/objetivos", post(objetivos::upsert))
        .route("/api/admin/objetivos/:id", delete(objetivos::delete))
        .route("/api/admin/usuarios", get(usuarios::list).post(usuarios::create))
        .route(
            "/api/admin/usuarios/:id",
            put(usuarios::update).delete(usuarios::delete),
        )
        // session → admin gate → user re-check (admin gate needs no database)
        .route_layer(from_fn_with_state(state, validate_user_middleware))
        .route_layer(from_fn(require_admin_middleware))
        .route_layer(from_fn(require_session_middleware))
}

/// Credentials are allowed so browsers send the session cookie cross-origin.
/// Development mirrors any origin; other environments use the configured list.
fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    if !cfg.security.enable_cors {
        return CorsLayer::new();
    }

    let allow_origin = if crate::is_development!() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = cfg
            .security
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, REQUEST_ID_HEADER.clone()])
        .expose_headers([REQUEST_ID_HEADER.clone()])
        .allow_credentials(true)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the defaults.
pub fn init_tracing(request_logging: bool) {
    let default = if request_logging {
        "sigia_api=info,tower_http=info"
    } else {
        "sigia_api=info,tower_http=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("SIGIA API listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

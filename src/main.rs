use sigia_api::config;
use sigia_api::database::Database;
use sigia_api::server;
use sigia_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the configuration singleton is first read
    let _ = dotenvy::dotenv();

    let config = config::config();
    server::init_tracing(config.api.enable_request_logging);
    tracing::info!("Starting SIGIA API in {:?} mode", config.environment);

    if config.security.session_secret.is_empty() {
        tracing::warn!("SECURITY_SESSION_SECRET is not set; logins will be refused");
    } else if sigia_api::is_development!() {
        tracing::warn!("Using the built-in development session secret");
    }

    let pool = Database::connect(&config.database)?;

    if config.database.auto_migrate {
        if let Err(e) = Database::migrate(&pool).await {
            tracing::warn!("Automatic migration failed, continuing: {}", e);
        }
    }

    server::serve(AppState::new(pool), config.api.port).await
}

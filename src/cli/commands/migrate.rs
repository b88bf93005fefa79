use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::Database;

pub async fn handle(pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    Database::migrate(pool).await?;
    output_success(&output_format, "Migrations applied", None)
}

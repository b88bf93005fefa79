pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config;
use crate::database::Database;

#[derive(Parser)]
#[command(name = "sigia")]
#[command(about = "SIGIA CLI - Database and user administration for the SIGIA API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, conflicts_with = "json", help = "Output in human-readable text format (default)")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Load companies, gerencias and variables from a YAML catalog")]
    Seed {
        #[arg(help = "Path to the YAML catalog")]
        file: std::path::PathBuf,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        match (cli.json, cli.text) {
            (true, false) => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Connect with the server's database settings, waiting for the first connection
async fn connect() -> anyhow::Result<PgPool> {
    let pool = Database::connect(&config::config().database)?;
    Database::health_check(&pool).await?;
    Ok(pool)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let pool = connect().await?;

    match cli.command {
        Commands::Migrate => commands::migrate::handle(&pool, output_format).await,
        Commands::User { cmd } => commands::user::handle(&pool, cmd, output_format).await,
        Commands::Seed { file } => commands::seed::handle(&pool, &file, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_of(args: &[&str]) -> Result<OutputFormat, clap::Error> {
        Cli::try_parse_from(args).map(|cli| OutputFormat::from_cli(&cli))
    }

    #[test]
    fn output_format_flags() {
        assert!(matches!(format_of(&["sigia", "migrate"]).unwrap(), OutputFormat::Text));
        assert!(matches!(format_of(&["sigia", "--text", "migrate"]).unwrap(), OutputFormat::Text));
        assert!(matches!(format_of(&["sigia", "user", "list", "--json"]).unwrap(), OutputFormat::Json));
        assert!(format_of(&["sigia", "--json", "--text", "migrate"]).is_err());
    }

    #[test]
    fn user_create_parses_role() {
        let cli = Cli::try_parse_from(["sigia", "user", "create", "ana", "--rol", "operador", "--empresa", "2"]).unwrap();
        match cli.command {
            Commands::User {
                cmd: commands::user::UserCommands::Create { usuario, rol, empresa, .. },
            } => {
                assert_eq!(usuario, "ana");
                assert_eq!(rol, crate::auth::Role::Operador);
                assert_eq!(empresa, Some(2));
            }
            _ => panic!("expected user create"),
        }
        assert!(Cli::try_parse_from(["sigia", "user", "create", "ana", "--rol", "root"]).is_err());
    }
}

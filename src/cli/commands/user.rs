use clap::Subcommand;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Role;
use crate::cli::utils::{output_empty_collection, output_success, print_table};
use crate::cli::OutputFormat;
use crate::services::usuarios::{self, NewUsuario};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user account")]
    Create {
        #[arg(help = "Login name")]
        usuario: String,
        #[arg(long, help = "Role: admin, operador or consulta")]
        rol: Role,
        #[arg(long, help = "Company the user belongs to (required unless admin)")]
        empresa: Option<i32>,
        #[arg(long, help = "Display name (defaults to the login name)")]
        nombre: Option<String>,
        #[arg(long, help = "Password (a random one is generated if omitted)")]
        clave: Option<String>,
    },

    #[command(about = "Set a user's password")]
    Passwd {
        #[arg(help = "Login name")]
        usuario: String,
        #[arg(long, help = "New password")]
        clave: String,
    },

    #[command(about = "List user accounts")]
    List,
}

pub async fn handle(pool: &PgPool, cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { usuario, rol, empresa, nombre, clave } => {
            let generated = clave.is_none();
            let clave = clave.unwrap_or_else(generate_password);

            let user = usuarios::create(
                pool,
                NewUsuario {
                    nombre: nombre.unwrap_or_else(|| usuario.clone()),
                    usuario,
                    clave: clave.clone(),
                    rol,
                    id_empresa: empresa,
                },
            )
            .await?;

            let mut data = json!({ "user": user });
            if generated {
                data["clave"] = json!(clave);
            }
            output_success(&output_format, &format!("User '{}' created", user.usuario), Some(data))?;

            if generated && matches!(output_format, OutputFormat::Text) {
                println!("Generated password: {}", clave);
            }
            Ok(())
        }
        UserCommands::Passwd { usuario, clave } => {
            usuarios::set_password(pool, &usuario, &clave).await?;
            output_success(&output_format, &format!("Password updated for '{}'", usuario), None)
        }
        UserCommands::List => {
            let users = usuarios::list(pool).await?;
            if users.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "users": users }))?);
                }
                OutputFormat::Text => {
                    let rows = users
                        .iter()
                        .map(|u| {
                            vec![
                                u.id_usuario.to_string(),
                                u.usuario.clone(),
                                u.nombre.clone(),
                                u.rol.clone(),
                                u.id_empresa.map(|e| e.to_string()).unwrap_or_else(|| "-".into()),
                                if u.activo { "yes".into() } else { "no".into() },
                            ]
                        })
                        .collect::<Vec<_>>();
                    print_table(&["ID", "USUARIO", "NOMBRE", "ROL", "EMPRESA", "ACTIVO"], &rows);
                }
            }
            Ok(())
        }
    }
}

fn generate_password() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

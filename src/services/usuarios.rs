use serde::{Deserialize, Deserializer};
use sqlx::PgPool;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{AuthError, Role};
use crate::database::models::Usuario;
use crate::database::timed;
use crate::error::ApiError;
use crate::services::validate;

#[derive(Debug, Deserialize)]
pub struct NewUsuario {
    pub usuario: String,
    pub clave: String,
    pub nombre: String,
    pub rol: Role,
    pub id_empresa: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsuarioUpdate {
    pub nombre: Option<String>,
    pub rol: Option<Role>,
    /// Absent keeps the company; an explicit `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub id_empresa: Option<Option<i32>>,
    pub activo: Option<bool>,
    pub clave: Option<String>,
}

/// Marks a field as present, so `null` is told apart from a missing key
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const COLUMNS: &str = "id_usuario, usuario, clave_hash, nombre, rol, id_empresa, activo, creado_en";

/// Every non-admin role works on behalf of exactly one company
pub fn check_role_company(rol: Role, id_empresa: Option<i32>) -> Result<(), ApiError> {
    if rol != Role::Admin && id_empresa.is_none() {
        return Err(ApiError::unprocessable_entity(format!(
            "Role '{}' requires a company",
            rol
        )));
    }
    Ok(())
}

/// An admin may not deactivate or demote their own account
pub fn check_self_change(acting_id: i32, id_usuario: i32, input: &UsuarioUpdate) -> Result<(), ApiError> {
    if acting_id != id_usuario {
        return Ok(());
    }
    if input.activo == Some(false) {
        return Err(ApiError::unprocessable_entity("You cannot deactivate your own account"));
    }
    if matches!(input.rol, Some(rol) if rol != Role::Admin) {
        return Err(ApiError::unprocessable_entity("You cannot remove your own administrator role"));
    }
    Ok(())
}

/// Parse the role stored on a user row
pub fn role_of(user: &Usuario) -> Result<Role, ApiError> {
    user.rol.parse::<Role>().map_err(|e| {
        tracing::error!("User {} has an unknown role: {}", user.usuario, e);
        ApiError::internal_server_error("User record is inconsistent")
    })
}

pub async fn list(pool: &PgPool) -> Result<Vec<Usuario>, ApiError> {
    let sql = format!("SELECT {} FROM usuarios_lecturas ORDER BY usuario", COLUMNS);
    let rows = timed("usuarios.list", sqlx::query_as::<_, Usuario>(&sql).fetch_all(pool)).await?;
    Ok(rows)
}

pub async fn get(pool: &PgPool, id_usuario: i32) -> Result<Usuario, ApiError> {
    find(pool, id_usuario)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", id_usuario)))
}

pub async fn find(pool: &PgPool, id_usuario: i32) -> Result<Option<Usuario>, ApiError> {
    let sql = format!("SELECT {} FROM usuarios_lecturas WHERE id_usuario = $1", COLUMNS);
    let row = timed(
        "usuarios.find",
        sqlx::query_as::<_, Usuario>(&sql).bind(id_usuario).fetch_optional(pool),
    )
    .await?;
    Ok(row)
}

pub async fn find_by_usuario(pool: &PgPool, usuario: &str) -> Result<Option<Usuario>, ApiError> {
    let sql = format!("SELECT {} FROM usuarios_lecturas WHERE usuario = $1", COLUMNS);
    let row = timed(
        "usuarios.find_by_usuario",
        sqlx::query_as::<_, Usuario>(&sql).bind(usuario.trim()).fetch_optional(pool),
    )
    .await?;
    Ok(row)
}

/// Check credentials. Unknown users, wrong passwords and inactive accounts
/// all fail the same way.
pub async fn authenticate(pool: &PgPool, usuario: &str, clave: &str) -> Result<Usuario, ApiError> {
    let user = match find_by_usuario(pool, usuario).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login failed: unknown user '{}'", usuario);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    if !verify_password(clave, &user.clave_hash) {
        tracing::warn!("Login failed: wrong password for '{}'", user.usuario);
        return Err(AuthError::InvalidCredentials.into());
    }
    if !user.activo {
        tracing::warn!("Login failed: user '{}' is inactive", user.usuario);
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(user)
}

pub async fn create(pool: &PgPool, input: NewUsuario) -> Result<Usuario, ApiError> {
    let usuario = validate::bounded_name("usuario", &input.usuario, validate::MAX_USUARIO_LEN)?;
    let nombre = validate::name("nombre", &input.nombre)?;
    validate::password(&input.clave)?;
    check_role_company(input.rol, input.id_empresa)?;

    let sql = format!(
        "INSERT INTO usuarios_lecturas (usuario, clave_hash, nombre, rol, id_empresa) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        COLUMNS
    );
    let user = timed(
        "usuarios.create",
        sqlx::query_as::<_, Usuario>(&sql)
            .bind(usuario)
            .bind(hash_password(&input.clave))
            .bind(nombre)
            .bind(input.rol.as_str())
            .bind(input.id_empresa)
            .fetch_one(pool),
    )
    .await?;

    tracing::info!("Created user {} with role {}", user.usuario, user.rol);
    Ok(user)
}

pub async fn update(pool: &PgPool, id_usuario: i32, input: UsuarioUpdate) -> Result<Usuario, ApiError> {
    let current = get(pool, id_usuario).await?;

    let nombre = input.nombre.as_deref().map(|n| validate::name("nombre", n)).transpose()?;
    let rol = match input.rol {
        Some(rol) => rol,
        None => role_of(&current)?,
    };
    let id_empresa = input.id_empresa.unwrap_or(current.id_empresa);
    check_role_company(rol, id_empresa)?;

    let clave_hash = match input.clave.as_deref() {
        Some(clave) => {
            validate::password(clave)?;
            Some(hash_password(clave))
        }
        None => None,
    };

    let sql = format!(
        "UPDATE usuarios_lecturas SET \
            nombre = COALESCE($2, nombre), \
            rol = $3, \
            id_empresa = $4, \
            activo = COALESCE($5, activo), \
            clave_hash = COALESCE($6, clave_hash) \
         WHERE id_usuario = $1 RETURNING {}",
        COLUMNS
    );
    let user = timed(
        "usuarios.update",
        sqlx::query_as::<_, Usuario>(&sql)
            .bind(id_usuario)
            .bind(nombre)
            .bind(rol.as_str())
            .bind(id_empresa)
            .bind(input.activo)
            .bind(clave_hash)
            .fetch_one(pool),
    )
    .await?;

    tracing::info!("Updated user {}", user.usuario);
    Ok(user)
}

/// Users are deactivated rather than removed so captured values keep their author
pub async fn deactivate(pool: &PgPool, id_usuario: i32) -> Result<(), ApiError> {
    let result = timed(
        "usuarios.deactivate",
        sqlx::query("UPDATE usuarios_lecturas SET activo = FALSE WHERE id_usuario = $1")
            .bind(id_usuario)
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("User {} not found", id_usuario)));
    }
    tracing::info!("Deactivated user {}", id_usuario);
    Ok(())
}

pub async fn set_password(pool: &PgPool, usuario: &str, clave: &str) -> Result<(), ApiError> {
    validate::password(clave)?;
    let result = timed(
        "usuarios.set_password",
        sqlx::query("UPDATE usuarios_lecturas SET clave_hash = $2 WHERE usuario = $1")
            .bind(usuario.trim())
            .bind(hash_password(clave))
            .execute(pool),
    )
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("User '{}' not found", usuario)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_admin_roles_need_a_company() {
        assert!(check_role_company(Role::Admin, None).is_ok());
        assert!(check_role_company(Role::Operador, Some(1)).is_ok());
        assert_eq!(check_role_company(Role::Operador, None).unwrap_err().status_code(), 422);
        assert_eq!(check_role_company(Role::Consulta, None).unwrap_err().status_code(), 422);
    }

    #[test]
    fn new_user_payload_parses_role() {
        let input: NewUsuario = serde_json::from_value(serde_json::json!({
            "usuario": "ana",
            "clave": "secreta",
            "nombre": "Ana",
            "rol": "consulta",
            "id_empresa": 3
        }))
        .unwrap();
        assert_eq!(input.rol, Role::Consulta);

        let bad = serde_json::from_value::<NewUsuario>(serde_json::json!({
            "usuario": "ana", "clave": "secreta", "nombre": "Ana", "rol": "root"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn update_tells_null_company_from_absent() {
        let absent: UsuarioUpdate = serde_json::from_value(serde_json::json!({ "nombre": "Ana" })).unwrap();
        assert_eq!(absent.id_empresa, None);

        let cleared: UsuarioUpdate =
            serde_json::from_value(serde_json::json!({ "rol": "admin", "id_empresa": null })).unwrap();
        assert_eq!(cleared.id_empresa, Some(None));

        let moved: UsuarioUpdate = serde_json::from_value(serde_json::json!({ "id_empresa": 4 })).unwrap();
        assert_eq!(moved.id_empresa, Some(Some(4)));
    }

    #[test]
    fn admins_cannot_lock_themselves_out() {
        let deactivate = UsuarioUpdate {
            activo: Some(false),
            ..Default::default()
        };
        let demote = UsuarioUpdate {
            rol: Some(Role::Consulta),
            id_empresa: Some(Some(1)),
            ..Default::default()
        };
        let rename = UsuarioUpdate {
            nombre: Some("Otro".into()),
            rol: Some(Role::Admin),
            ..Default::default()
        };

        assert_eq!(check_self_change(1, 1, &deactivate).unwrap_err().status_code(), 422);
        assert_eq!(check_self_change(1, 1, &demote).unwrap_err().status_code(), 422);
        assert!(check_self_change(1, 1, &rename).is_ok());
        // Other accounts are fair game
        assert!(check_self_change(1, 2, &deactivate).is_ok());
        assert!(check_self_change(1, 2, &demote).is_ok());
    }
}

//! Company scoping for multi-tenant access.
//!
//! Admins may address any company. Every other role is pinned to the company
//! stored in its session, and naming a different one is refused.

use crate::auth::Session;
use crate::error::ApiError;

/// Resolve the company a request operates on when one is mandatory
pub fn resolve_empresa(session: &Session, requested: Option<i32>) -> Result<i32, ApiError> {
    match empresa_filter(session, requested)? {
        Some(id) => Ok(id),
        None => Err(ApiError::invalid_field("empresa", "A company must be specified")),
    }
}

/// Resolve an optional company filter. `None` means "all companies" and is
/// only ever returned for admins.
pub fn empresa_filter(session: &Session, requested: Option<i32>) -> Result<Option<i32>, ApiError> {
    if session.is_admin() {
        return Ok(requested);
    }

    let own = session
        .id_empresa
        .ok_or_else(|| ApiError::forbidden("User is not assigned to a company"))?;

    match requested {
        Some(id) if id != own => Err(ApiError::forbidden(format!("Access to company {} is not allowed", id))),
        _ => Ok(Some(own)),
    }
}

/// Check access to a record that belongs to `id_empresa`
pub fn ensure_empresa_access(session: &Session, id_empresa: i32) -> Result<(), ApiError> {
    empresa_filter(session, Some(id_empresa)).map(|_| ())
}

pub fn require_admin(session: &Session) -> Result<(), ApiError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Administrator role required"))
    }
}

pub fn require_capture(session: &Session) -> Result<(), ApiError> {
    if session.can_capture() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Role is not allowed to capture values"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn session(rol: Role, id_empresa: Option<i32>) -> Session {
        Session {
            id_usuario: 1,
            usuario: "u".into(),
            nombre: "U".into(),
            rol,
            id_empresa,
            iat: 0,
            exp: i64::MAX,
            iss: "sigia-api".into(),
        }
    }

    #[test]
    fn admin_chooses_freely() {
        let admin = session(Role::Admin, None);
        assert_eq!(empresa_filter(&admin, None).unwrap(), None);
        assert_eq!(empresa_filter(&admin, Some(4)).unwrap(), Some(4));
        assert_eq!(resolve_empresa(&admin, Some(4)).unwrap(), 4);
        assert_eq!(resolve_empresa(&admin, None).unwrap_err().status_code(), 400);
    }

    #[test]
    fn others_are_pinned_to_their_company() {
        let op = session(Role::Operador, Some(2));
        assert_eq!(empresa_filter(&op, None).unwrap(), Some(2));
        assert_eq!(resolve_empresa(&op, None).unwrap(), 2);
        assert_eq!(resolve_empresa(&op, Some(2)).unwrap(), 2);
        assert_eq!(resolve_empresa(&op, Some(3)).unwrap_err().status_code(), 403);
        assert!(ensure_empresa_access(&op, 2).is_ok());
        assert!(ensure_empresa_access(&op, 9).is_err());
    }

    #[test]
    fn non_admin_without_company_is_forbidden() {
        let orphan = session(Role::Consulta, None);
        assert_eq!(empresa_filter(&orphan, None).unwrap_err().status_code(), 403);
    }

    #[test]
    fn role_gates() {
        assert!(require_admin(&session(Role::Admin, None)).is_ok());
        assert_eq!(require_admin(&session(Role::Operador, Some(1))).unwrap_err().status_code(), 403);
        assert!(require_capture(&session(Role::Operador, Some(1))).is_ok());
        assert_eq!(require_capture(&session(Role::Consulta, Some(1))).unwrap_err().status_code(), 403);
    }
}

pub mod cookie;
pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::database::models::Usuario;

const ISSUER: &str = "sigia-api";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session presented")]
    MissingSession,

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session secret not configured")]
    SecretNotConfigured,

    #[error("Session token generation error: {0}")]
    TokenGeneration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operador,
    Consulta,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operador => "operador",
            Role::Consulta => "consulta",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "operador" => Ok(Role::Operador),
            "consulta" => Ok(Role::Consulta),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session claims carried in the session cookie (or a Bearer header)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id_usuario: i32,
    pub usuario: String,
    pub nombre: String,
    pub rol: Role,
    pub id_empresa: Option<i32>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Session {
    /// Build a session for a user row, expiring after `expiry_hours`
    pub fn for_user(user: &Usuario, rol: Role, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id_usuario: user.id_usuario,
            usuario: user.usuario.clone(),
            nombre: user.nombre.clone(),
            rol,
            id_empresa: user.id_empresa,
            iat: now.timestamp(),
            exp,
            iss: ISSUER.to_string(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.rol == Role::Admin
    }

    /// Admins and operators may capture monthly values
    pub fn can_capture(&self) -> bool {
        matches!(self.rol, Role::Admin | Role::Operador)
    }

    /// Seconds until expiry, never negative
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

pub fn encode_session(session: &Session, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), session, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn decode_session(token: &str, secret: &str) -> Result<Session, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);

    let token_data = decode::<Session>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidSession(e.to_string()))?;

    Ok(token_data.claims)
}

/// Sign a session with the configured secret
pub fn issue_token(session: &Session) -> Result<String, AuthError> {
    encode_session(session, &config::config().security.session_secret)
}

/// Verify a token with the configured secret
pub fn verify_token(token: &str) -> Result<Session, AuthError> {
    decode_session(token, &config::config().security.session_secret)
}

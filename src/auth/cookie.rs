use axum::http::{header, HeaderMap};

use super::AuthError;
use crate::config::SecurityConfig;

/// Pull the session token from the request: the session cookie first,
/// then an `Authorization: Bearer` header (clients that keep the token in localStorage).
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, AuthError> {
    if let Some(token) = cookie_value(headers, cookie_name) {
        return Ok(token);
    }

    match headers.get(header::AUTHORIZATION) {
        Some(value) => {
            let auth_str = value
                .to_str()
                .map_err(|_| AuthError::InvalidSession("Invalid Authorization header format".into()))?;
            match auth_str.strip_prefix("Bearer ") {
                Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
                Some(_) => Err(AuthError::InvalidSession("Empty bearer token".into())),
                None => Err(AuthError::InvalidSession("Authorization header must use Bearer token format".into())),
            }
        }
        None => Err(AuthError::MissingSession),
    }
}

/// Find a cookie by name across every `Cookie` header
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// `Set-Cookie` value carrying a fresh session
pub fn session_cookie(cfg: &SecurityConfig, token: &str, max_age_secs: i64) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cfg.cookie_name,
        token,
        max_age_secs.max(0)
    );
    if cfg.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session
pub fn clear_cookie(cfg: &SecurityConfig) -> String {
    session_cookie(cfg, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn security(secure: bool) -> SecurityConfig {
        SecurityConfig {
            session_secret: "s".into(),
            session_expiry_hours: 1,
            cookie_name: "sigia_session".into(),
            cookie_secure: secure,
            enable_cors: false,
            cors_origins: vec![],
        }
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; sigia_session=abc.def.ghi; lang=es"));
        assert_eq!(cookie_value(&headers, "sigia_session").as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sigia_session=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&headers, "sigia_session").unwrap(), "from-cookie");
    }

    #[test]
    fn falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(extract_token(&headers, "sigia_session").unwrap(), "tok");
    }

    #[test]
    fn missing_and_malformed() {
        let headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers, "sigia_session"), Err(AuthError::MissingSession)));

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(extract_token(&headers, "sigia_session"), Err(AuthError::InvalidSession(_))));

        // An emptied (logged out) cookie counts as absent
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sigia_session="));
        assert!(matches!(extract_token(&headers, "sigia_session"), Err(AuthError::MissingSession)));
    }

    #[test]
    fn set_cookie_attributes() {
        let c = session_cookie(&security(true), "tok", 3600);
        assert!(c.starts_with("sigia_session=tok;"));
        assert!(c.contains("HttpOnly"));
        assert!(c.contains("Max-Age=3600"));
        assert!(c.ends_with("; Secure"));

        let cleared = clear_cookie(&security(false));
        assert!(cleared.starts_with("sigia_session=;"));
        assert!(cleared.contains("Max-Age=0"));
        assert!(!cleared.contains("Secure"));
    }
}

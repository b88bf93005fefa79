mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn login_with_unknown_user_fails() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "usuario": "nadie-registrado", "clave": "incorrecta" }))
        .send()
        .await?;

    // UNAUTHORIZED against a real database, SERVICE_UNAVAILABLE without one
    assert!(
        res.status() == StatusCode::UNAUTHORIZED || res.status() == StatusCode::SERVICE_UNAVAILABLE,
        "Expected UNAUTHORIZED or SERVICE_UNAVAILABLE, got {}",
        res.status()
    );
    assert!(res.headers().get("set-cookie").is_none());

    let body = res.json::<serde_json::Value>().await?;
    let code = common::error_code(&body);
    assert!(code == "UNAUTHORIZED" || code == "SERVICE_UNAVAILABLE", "code {}", code);
    Ok(())
}

#[tokio::test]
async fn login_rejects_malformed_bodies() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(&res.json::<serde_json::Value>().await?), "INVALID_JSON");

    let res = client
        .post(server.url("/auth/login"))
        .json(&json!({ "usuario": "", "clave": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_code(&res.json::<serde_json::Value>().await?), "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_session_cookie() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(server.url("/auth/logout")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("sigia_session=;"), "{}", set_cookie);
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(set_cookie.contains("HttpOnly"));
    Ok(())
}

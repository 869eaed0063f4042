mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn sign_up_with_empty_fields_is_rejected_before_the_provider() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/agency/sign-up", server.base_url))
        .json(&json!({ "name": "", "email": "", "password": "" }))
        .send()
        .await?;

    // Required-field validation answers without touching the database
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let field_errors = body["field_errors"].as_object().expect("field_errors");
    assert!(field_errors.contains_key("name"));
    assert!(field_errors.contains_key("email"));
    assert!(field_errors.contains_key("password"));
    Ok(())
}

#[tokio::test]
async fn sign_in_requires_email_and_password() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/agency/sign-in", server.base_url))
        .json(&json!({ "email": "owner@agency.test" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<serde_json::Value>().await?;
    let field_errors = body["field_errors"].as_object().expect("field_errors");
    assert!(field_errors.contains_key("password"));
    assert!(!field_errors.contains_key("email"));
    Ok(())
}

#[tokio::test]
async fn unknown_oauth_provider_is_a_bad_request() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client();

    let res = client
        .get(format!("{}/agency/oauth/myspace", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn google_oauth_redirects_to_the_provider() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = common::no_redirect_client();

    let res = client
        .get(format!("{}/agency/oauth/google", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert!(location.starts_with("https://accounts.google.com/"));
    Ok(())
}

#[tokio::test]
async fn protected_api_rejects_missing_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn protected_api_rejects_garbage_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .header("authorization", "Bearer not.a.token")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

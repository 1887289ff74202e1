mod common;

use anyhow::Result;
use serde_json::json;

#[tokio::test]
async fn admin_login_returns_token_and_user() -> Result<()> {
    let server = common::ensure_server().await?;

    let body = common::graphql(
        server,
        None,
        "mutation($email: String!, $password: String!) { \
            login(email: $email, password: $password) { token user { email isSuperAdmin } } \
         }",
        json!({ "email": "admin@ecogov.local", "password": "changeme" }),
    )
    .await?;

    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    let login = &body["data"]["login"];
    assert!(!login["token"].as_str().unwrap_or_default().is_empty());
    assert_eq!(login["user"]["email"], "admin@ecogov.local");
    assert_eq!(login["user"]["isSuperAdmin"], true);
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_an_authentication_error() -> Result<()> {
    let server = common::ensure_server().await?;

    let body = common::graphql(
        server,
        None,
        "mutation($email: String!, $password: String!) { \
            login(email: $email, password: $password) { token } \
         }",
        json!({ "email": "admin@ecogov.local", "password": "not-the-password" }),
    )
    .await?;

    assert_eq!(common::error_code(&body), Some("AUTHENTICATION_ERROR"));
    Ok(())
}

#[tokio::test]
async fn missing_token_yields_unauthenticated_context_not_transport_error() -> Result<()> {
    let server = common::ensure_server().await?;

    // The request itself succeeds; the field resolution carries the error.
    let body = common::graphql(server, None, "{ users { id } }", json!({})).await?;
    assert_eq!(common::error_code(&body), Some("AUTHENTICATION_ERROR"));
    Ok(())
}

#[tokio::test]
async fn role_holders_cannot_cross_into_other_domains() -> Result<()> {
    let server = common::ensure_server().await?;
    let admin = common::admin_token(server).await?;

    let email = format!("{}@test.local", common::unique("greening-clerk"));
    let body = common::graphql(
        server,
        Some(&admin),
        "mutation($input: CreateUserInput!) { createUser(input: $input) { id } }",
        json!({ "input": {
            "email": email,
            "password": "secret123",
            "roles": ["TREE_MANAGEMENT"]
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let clerk = common::login(server, &email, "secret123").await?;
    let body = common::graphql(
        server,
        Some(&clerk),
        "mutation($input: BelchingFeeInput!) { createBelchingFee(input: $input) { id } }",
        json!({ "input": {
            "amount": 500,
            "category": "public utility",
            "level": 1,
            "effectiveDate": "2025-01-01"
        }}),
    )
    .await?;
    assert_eq!(common::error_code(&body), Some("AUTHORIZATION_ERROR"));
    Ok(())
}

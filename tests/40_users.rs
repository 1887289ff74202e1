mod common;

use anyhow::Result;
use serde_json::json;

async fn create_user(
    server: &common::TestServer,
    token: &str,
    email: &str,
    roles: &[&str],
) -> Result<String> {
    let body = common::graphql(
        server,
        Some(token),
        "mutation($input: CreateUserInput!) { createUser(input: $input) { id email } }",
        json!({ "input": { "email": email, "password": "secret123", "roles": roles } }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    Ok(body["data"]["createUser"]["id"].as_str().unwrap().to_string())
}

async fn roles_of(
    server: &common::TestServer,
    token: &str,
    user_id: &str,
) -> Result<Vec<String>> {
    let body = common::graphql(
        server,
        Some(token),
        "query($id: UUID!) { user(id: $id) { roles } }",
        json!({ "id": user_id }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    Ok(body["data"]["user"]["roles"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r.as_str().map(str::to_string))
        .collect())
}

#[tokio::test]
async fn users_need_at_least_one_role() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: CreateUserInput!) { createUser(input: $input) { id } }",
        json!({ "input": {
            "email": format!("{}@test.local", common::unique("roleless")),
            "password": "secret123",
            "roles": []
        }}),
    )
    .await?;
    assert_eq!(common::error_code(&body), Some("INPUT_VALIDATION_ERROR"));
    Ok(())
}

#[tokio::test]
async fn last_role_cannot_be_removed() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let email = format!("{}@test.local", common::unique("single-role"));
    let user_id = create_user(server, &token, &email, &["TREE_MANAGEMENT"]).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($userId: UUID!) { removeUserRole(userId: $userId, role: TREE_MANAGEMENT) }",
        json!({ "userId": user_id }),
    )
    .await?;
    assert_eq!(common::error_code(&body), Some("INPUT_VALIDATION_ERROR"));

    // The role set is unchanged.
    assert_eq!(roles_of(server, &token, &user_id).await?, vec!["TREE_MANAGEMENT"]);

    // With a second role present, removal of the first succeeds.
    let body = common::graphql(
        server,
        Some(&token),
        "mutation($userId: UUID!) { addUserRole(userId: $userId, role: AIR_QUALITY) }",
        json!({ "userId": user_id }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($userId: UUID!) { removeUserRole(userId: $userId, role: TREE_MANAGEMENT) }",
        json!({ "userId": user_id }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    assert_eq!(roles_of(server, &token, &user_id).await?, vec!["AIR_QUALITY"]);
    Ok(())
}

#[tokio::test]
async fn soft_deleted_users_disappear_from_reads() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let email = format!("{}@test.local", common::unique("ephemeral"));
    let user_id = create_user(server, &token, &email, &["GOVERNMENT_EMISSION"]).await?;

    let list_emails = |body: serde_json::Value| -> Vec<String> {
        body["data"]["users"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|u| u["email"].as_str().map(str::to_string))
            .collect()
    };

    let body = common::graphql(server, Some(&token), "{ users { email } }", json!({})).await?;
    assert!(list_emails(body).contains(&email));

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($id: UUID!) { deleteUser(id: $id) }",
        json!({ "id": user_id }),
    )
    .await?;
    assert_eq!(body["data"]["deleteUser"], true);

    let body = common::graphql(server, Some(&token), "{ users { email } }", json!({})).await?;
    assert!(!list_emails(body).contains(&email));

    // Deleting again affects nothing and reports false.
    let body = common::graphql(
        server,
        Some(&token),
        "mutation($id: UUID!) { deleteUser(id: $id) }",
        json!({ "id": user_id }),
    )
    .await?;
    assert_eq!(body["data"]["deleteUser"], false);
    Ok(())
}

#[tokio::test]
async fn profile_updates_roundtrip() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let email = format!("{}@test.local", common::unique("profiled"));
    let user_id = create_user(server, &token, &email, &["AIR_QUALITY"]).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($userId: UUID!, $input: ProfileInput!) { \
            updateProfile(userId: $userId, input: $input) { firstName lastName jobTitle } \
         }",
        json!({ "userId": user_id, "input": {
            "firstName": "Maria",
            "lastName": "Santos",
            "jobTitle": "Air Quality Inspector"
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    let profile = &body["data"]["updateProfile"];
    assert_eq!(profile["firstName"], "Maria");
    assert_eq!(profile["jobTitle"], "Air Quality Inspector");
    Ok(())
}

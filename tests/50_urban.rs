mod common;

use anyhow::Result;
use serde_json::json;

#[tokio::test]
async fn seedling_request_roundtrip_keeps_items() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let requester = common::unique("Barangay San Isidro");
    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: SeedlingRequestInput!) { \
            createSeedlingRequest(input: $input) { id dateReceived requesterName items { name quantity } } \
         }",
        json!({ "input": {
            "dateReceived": "2025-06-02",
            "requesterName": requester,
            "address": "Purok 4",
            "items": [
                { "name": "Narra", "quantity": 25 },
                { "name": "Mahogany", "quantity": 10 }
            ],
            "notes": "For the riverside replanting"
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let created = &body["data"]["createSeedlingRequest"];
    assert_eq!(created["dateReceived"], "2025-06-02");
    let id = created["id"].as_str().unwrap();

    let body = common::graphql(
        server,
        Some(&token),
        "query($id: UUID!) { seedlingRequest(id: $id) { requesterName items { name quantity } } }",
        json!({ "id": id }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let fetched = &body["data"]["seedlingRequest"];
    assert_eq!(fetched["requesterName"], json!(requester));
    let items = fetched["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Narra");
    assert_eq!(items[0]["quantity"], 25);
    Ok(())
}

#[tokio::test]
async fn non_positive_item_quantities_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: SeedlingRequestInput!) { createSeedlingRequest(input: $input) { id } }",
        json!({ "input": {
            "dateReceived": "2025-06-02",
            "requesterName": "Anyone",
            "items": [{ "name": "Narra", "quantity": 0 }]
        }}),
    )
    .await?;
    assert_eq!(common::error_code(&body), Some("INPUT_VALIDATION_ERROR"));
    Ok(())
}

#[tokio::test]
async fn overview_counts_grow_with_requests() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "{ urbanOverview { seedlingRequestCount urbanGreeningCount totalSeedlingsRequested } }",
        json!({}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    let before = body["data"]["urbanOverview"]["seedlingRequestCount"]
        .as_i64()
        .unwrap();

    let request = common::graphql(
        server,
        Some(&token),
        "mutation($input: SeedlingRequestInput!) { createSeedlingRequest(input: $input) { id } }",
        json!({ "input": {
            "dateReceived": "2025-06-03",
            "requesterName": common::unique("requester"),
            "items": [{ "name": "Acacia", "quantity": 5 }]
        }}),
    )
    .await?;
    assert!(request["errors"].is_null(), "unexpected errors: {}", request);

    let body = common::graphql(
        server,
        Some(&token),
        "{ urbanOverview { seedlingRequestCount } }",
        json!({}),
    )
    .await?;
    let after = body["data"]["urbanOverview"]["seedlingRequestCount"]
        .as_i64()
        .unwrap();
    assert!(after > before);
    Ok(())
}

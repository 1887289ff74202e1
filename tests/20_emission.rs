mod common;

use anyhow::Result;
use serde_json::{json, Value};

async fn create_vehicle(server: &common::TestServer, token: &str) -> Result<Value> {
    let body = common::graphql(
        server,
        Some(token),
        "mutation($input: VehicleInput!) { \
            createVehicle(input: $input) { id plateNumber driverName } \
         }",
        json!({ "input": {
            "plateNumber": common::unique("SGK"),
            "driverName": "Initial Driver",
            "engineType": "diesel",
            "officeName": "City Engineering Office",
            "vehicleType": "truck",
            "wheels": 6
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    Ok(body["data"]["createVehicle"].clone())
}

#[tokio::test]
async fn emission_test_filtering_by_year_and_quarter() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let vehicle = create_vehicle(server, &token).await?;
    let vehicle_id = vehicle["id"].as_str().unwrap();

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: EmissionTestInput!) { \
            createEmissionTest(input: $input) { id testDate quarter year result } \
         }",
        json!({ "input": {
            "vehicleId": vehicle_id,
            "testDate": "2025-04-15",
            "quarter": 2,
            "year": 2025,
            "result": true
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    let test = &body["data"]["createEmissionTest"];
    let test_id = test["id"].as_str().unwrap();
    assert_eq!(test["testDate"], "2025-04-15");
    assert_eq!(test["quarter"], 2);
    assert_eq!(test["result"], true);

    // Matching filter includes the test.
    let body = common::graphql(
        server,
        Some(&token),
        "query($filters: EmissionTestFilters) { emissionTests(filters: $filters) { id } }",
        json!({ "filters": { "year": 2025, "quarter": 2 } }),
    )
    .await?;
    let ids: Vec<&str> = body["data"]["emissionTests"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert!(ids.contains(&test_id));

    // A different quarter excludes it.
    let body = common::graphql(
        server,
        Some(&token),
        "query($filters: EmissionTestFilters) { emissionTests(filters: $filters) { id } }",
        json!({ "filters": { "quarter": 1 } }),
    )
    .await?;
    let ids: Vec<&str> = body["data"]["emissionTests"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert!(!ids.contains(&test_id));

    Ok(())
}

#[tokio::test]
async fn quarter_outside_one_to_four_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let vehicle = create_vehicle(server, &token).await?;
    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: EmissionTestInput!) { createEmissionTest(input: $input) { id } }",
        json!({ "input": {
            "vehicleId": vehicle["id"],
            "testDate": "2025-04-15",
            "quarter": 5,
            "year": 2025,
            "result": false
        }}),
    )
    .await?;
    assert_eq!(common::error_code(&body), Some("INPUT_VALIDATION_ERROR"));
    Ok(())
}

#[tokio::test]
async fn deleting_a_nonexistent_vehicle_returns_false() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($id: UUID!) { deleteVehicle(id: $id) }",
        json!({ "id": "00000000-0000-0000-0000-000000000000" }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    assert_eq!(body["data"]["deleteVehicle"], false);
    Ok(())
}

#[tokio::test]
async fn driver_changes_append_to_the_history_log() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let vehicle = create_vehicle(server, &token).await?;
    let vehicle_id = vehicle["id"].as_str().unwrap();
    let plate = vehicle["plateNumber"].as_str().unwrap();

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($id: UUID!, $input: VehicleInput!) { \
            updateVehicle(id: $id, input: $input) { driverHistory { driverName } } \
         }",
        json!({ "id": vehicle_id, "input": {
            "plateNumber": plate,
            "driverName": "Replacement Driver",
            "engineType": "diesel",
            "officeName": "City Engineering Office",
            "vehicleType": "truck",
            "wheels": 6
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let history: Vec<&str> = body["data"]["updateVehicle"]["driverHistory"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|h| h["driverName"].as_str())
        .collect();
    assert_eq!(history.len(), 2);
    assert!(history.contains(&"Initial Driver"));
    assert!(history.contains(&"Replacement Driver"));
    Ok(())
}

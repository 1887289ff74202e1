mod common;

use anyhow::Result;
use serde_json::{json, Value};

fn amount_of(value: &Value) -> f64 {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .expect("numeric amount")
}

#[tokio::test]
async fn order_of_payment_roundtrip_formats_dates() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let order_no = common::unique("OP");
    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: OrderOfPaymentInput!) { \
            createOrderOfPayment(input: $input) { id orderNo plateNo operator amount dateIssued status } \
         }",
        json!({ "input": {
            "orderNo": order_no,
            "plateNo": "ABC123",
            "operator": "Acme",
            "amount": 500,
            "dateIssued": "2025-01-10",
            "status": "unpaid"
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let created = &body["data"]["createOrderOfPayment"];
    assert_eq!(created["orderNo"], json!(order_no));
    assert_eq!(created["dateIssued"], "2025-01-10");
    let id = created["id"].as_i64().unwrap();

    let body = common::graphql(
        server,
        Some(&token),
        "query($id: Int!) { \
            orderOfPayment(id: $id) { orderNo plateNo operator amount dateIssued status } \
         }",
        json!({ "id": id }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let fetched = &body["data"]["orderOfPayment"];
    assert_eq!(fetched["orderNo"], json!(order_no));
    assert_eq!(fetched["plateNo"], "ABC123");
    assert_eq!(fetched["operator"], "Acme");
    assert_eq!(amount_of(&fetched["amount"]), 500.0);
    assert_eq!(fetched["dateIssued"], "2025-01-10");
    assert_eq!(fetched["status"], "unpaid");
    Ok(())
}

#[tokio::test]
async fn deleting_a_nonexistent_fee_returns_false() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($id: Int!) { deleteBelchingFee(id: $id) }",
        json!({ "id": 999_999_999 }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    assert_eq!(body["data"]["deleteBelchingFee"], false);
    Ok(())
}

#[tokio::test]
async fn negative_amounts_are_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: BelchingFeeInput!) { createBelchingFee(input: $input) { id } }",
        json!({ "input": {
            "amount": -5,
            "category": "public utility",
            "level": 1,
            "effectiveDate": "2025-01-01"
        }}),
    )
    .await?;
    assert_eq!(common::error_code(&body), Some("INPUT_VALIDATION_ERROR"));
    Ok(())
}

#[tokio::test]
async fn driver_search_groups_violations_per_driver() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::admin_token(server).await?;

    let body = common::graphql(
        server,
        Some(&token),
        "mutation($input: BelchingRecordInput!) { createBelchingRecord(input: $input) { id } }",
        json!({ "input": {
            "plateNumber": common::unique("UVX"),
            "recordStatus": "APPREHENDED",
            "offenseLevel": 1
        }}),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    let record_id = body["data"]["createBelchingRecord"]["id"].as_i64().unwrap();

    let driver_name = common::unique("Juan Dela Cruz");
    for date in ["2025-02-01", "2025-03-01"] {
        let body = common::graphql(
            server,
            Some(&token),
            "mutation($input: BelchingViolationInput!) { \
                createBelchingViolation(input: $input) { id } \
             }",
            json!({ "input": {
                "recordId": record_id,
                "dateOfApprehension": date,
                "driverName": driver_name,
                "paid": false
            }}),
        )
        .await?;
        assert!(body["errors"].is_null(), "unexpected errors: {}", body);
    }

    let body = common::graphql(
        server,
        Some(&token),
        "query($q: String!) { \
            searchDrivers(query: $q) { driverName apprehensionCount violations { dateOfApprehension } } \
         }",
        json!({ "q": driver_name }),
    )
    .await?;
    assert!(body["errors"].is_null(), "unexpected errors: {}", body);

    let results = body["data"]["searchDrivers"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["driverName"], json!(driver_name));
    assert_eq!(results[0]["apprehensionCount"], 2);
    assert_eq!(results[0]["violations"].as_array().unwrap().len(), 2);
    Ok(())
}

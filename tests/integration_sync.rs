//! End-to-end sync integration tests
//!
//! Drives the orchestrator through the real GraphQL gateway, executor and
//! HTTP transport against a wiremock server:
//! - create then set inventory
//! - recovery from throttling
//! - user errors and transport failures isolated per product

mod common;

use std::sync::Arc;

use catalog_sync::models::{InputRow, InventoryOutcome, SyncOutcome, UpsertRecord};
use catalog_sync::sync::CatalogSync;
use common::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn shirt_record() -> UpsertRecord {
    let mut record = UpsertRecord::new("shirt-1");
    record.variants.push(
        InputRow::new()
            .with("title", "Shirt")
            .with("description", "Cotton")
            .with("sku", "S1")
            .with("variant_title", "Small")
            .with("price", "10.00")
            .with("quantity", "10"),
    );
    record
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "productByIdentifier": null },
        "extensions": { "cost": {
            "requestedQueryCost": 10,
            "actualQueryCost": 2,
            "throttleStatus": { "maximumAvailable": 2000.0, "currentlyAvailable": 1998, "restoreRate": 100.0 }
        } }
    }))
}

fn shirt_found() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "productByIdentifier": {
            "id": "gid://shopify/Product/1",
            "handle": "shirt-1",
            "title": "Shirt",
            "variants": { "nodes": [
                { "id": "gid://shopify/ProductVariant/1", "sku": "S1",
                  "inventoryItem": { "id": "gid://shopify/InventoryItem/1" } }
            ] }
        } }
    }))
}

fn product_set_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": { "productSet": {
            "product": { "id": "gid://shopify/Product/1", "handle": "shirt-1" },
            "userErrors": []
        } }
    }))
}

/// Test 1: New product is created and its quantity set
#[tokio::test]
async fn test_create_product_with_inventory() {
    let server = MockServer::start().await;

    // Initial lookup misses, the re-fetch after the upsert finds it
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("productByIdentifier"))
        .respond_with(not_found())
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("productByIdentifier"))
        .respond_with(shirt_found())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("productSet"))
        .and(body_partial_json(json!({
            "variables": { "input": { "handle": "shirt-1", "title": "Shirt" } }
        })))
        .respond_with(product_set_ok())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("inventorySetQuantities"))
        .and(body_partial_json(json!({
            "variables": { "input": { "quantities": [{
                "inventoryItemId": "gid://shopify/InventoryItem/1",
                "locationId": LOCATION,
                "quantity": 10
            }] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "inventorySetQuantities": { "userErrors": [] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sync = CatalogSync::new(Arc::new(create_test_gateway(&server)), test_options());
    let report = sync.run(&[shirt_record()]).await;

    assert_eq!(
        report.outcome("shirt-1"),
        Some(&SyncOutcome::Upserted {
            product_id: "gid://shopify/Product/1".to_string(),
            inventory: InventoryOutcome::Applied { lines: 1 },
        })
    );
}

/// Test 2: Throttled upsert is retried and then succeeds
#[tokio::test]
async fn test_throttled_upsert_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("productByIdentifier"))
        .respond_with(shirt_found())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("productSet"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0.02"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("productSet"))
        .and(body_partial_json(json!({
            "variables": { "input": { "variants": [{ "id": "gid://shopify/ProductVariant/1", "sku": "S1" }] } }
        })))
        .respond_with(product_set_ok())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("inventorySetQuantities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "inventorySetQuantities": { "userErrors": [] } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sync = CatalogSync::new(Arc::new(create_test_gateway(&server)), test_options());
    let report = sync.run(&[shirt_record()]).await;

    assert_eq!(report.upserted(), 1);
    assert_eq!(report.transport_failures(), 0);
}

/// Test 3: Rejected product does not block the next one
#[tokio::test]
async fn test_user_errors_isolated_per_product() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("productByIdentifier"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("productSet"))
        .and(body_partial_json(json!({ "variables": { "identifier": { "handle": "bad" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "productSet": {
                "product": null,
                "userErrors": [{ "field": ["input", "title"], "message": "Title can't be blank", "code": "BLANK" }]
            } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("productSet"))
        .and(body_partial_json(json!({ "variables": { "identifier": { "handle": "good" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "productSet": {
                "product": { "id": "gid://shopify/Product/2", "handle": "good" },
                "userErrors": []
            } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("inventorySetQuantities"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut bad = UpsertRecord::new("bad");
    bad.variants.push(
        InputRow::new()
            .with("sku", "B1")
            .with("price", "1.00")
            .with("quantity", "4"),
    );
    let mut good = UpsertRecord::new("good");
    good.variants.push(
        InputRow::new()
            .with("title", "Good")
            .with("sku", "G1")
            .with("price", "2.00"),
    );

    let sync = CatalogSync::new(Arc::new(create_test_gateway(&server)), test_options());
    let report = sync.run(&[bad, good]).await;

    match report.outcome("bad") {
        Some(SyncOutcome::UserErrorReported { errors }) => {
            assert_eq!(errors[0].field_path(), "input.title");
            assert_eq!(errors[0].code.as_deref(), Some("BLANK"));
        }
        other => panic!("Expected UserErrorReported, got {:?}", other),
    }
    assert!(matches!(
        report.outcome("good"),
        Some(SyncOutcome::Upserted {
            inventory: InventoryOutcome::NothingToSet,
            ..
        })
    ));
}

/// Test 4: Exhausted retries are recorded as a transport failure
#[tokio::test]
async fn test_rate_limit_exhaustion_recorded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let sync = CatalogSync::new(Arc::new(create_test_gateway(&server)), test_options());
    let report = sync.run(&[shirt_record()]).await;

    assert_eq!(
        report.outcome("shirt-1"),
        Some(&SyncOutcome::TransportFailed {
            message: "Rate limited".to_string()
        })
    );
}

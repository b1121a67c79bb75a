mod common;

use collectives_api::domain::{LegalDocumentType, NewLegalDocument};
use collectives_api::graphql::create_schema;
use collectives_api::storage::{DatabaseStorage, InMemoryStorage, Storage};
use common::{error_code, execute, seed, seeded_schema, settings};
use std::sync::Arc;
use tempfile::tempdir;

const CREATE: &str = r#"
    mutation Create($input: LegalDocumentCreateInput!) {
        createLegalDocument(legalDocument: $input) {
            id legacyId year documentType requestStatus
            host { slug }
            account { slug }
        }
    }
"#;

async fn create(schema: &collectives_api::graphql::GraphQLSchema, input: serde_json::Value) -> serde_json::Value {
    let request = async_graphql::Request::new(CREATE)
        .variables(async_graphql::Variables::from_json(serde_json::json!({ "input": input })));
    serde_json::to_value(schema.execute(request).await).unwrap()
}

#[tokio::test]
async fn created_document_is_queryable() {
    let schema = seeded_schema().await;

    let response = create(
        &schema,
        serde_json::json!({
            "host": {"slug": "opensource"},
            "account": {"slug": "alice"},
            "year": 2024
        }),
    )
    .await;
    let created = &response["data"]["createLegalDocument"];
    assert_eq!(created["year"], 2024);
    assert_eq!(created["documentType"], "US_TAX_FORM");
    assert_eq!(created["requestStatus"], "NOT_REQUESTED");
    assert_eq!(created["host"]["slug"], "opensource");
    assert_eq!(created["account"]["slug"], "alice");

    let response = execute(
        &schema,
        r#"{ legalDocument(host: {slug: "opensource"}, account: {slug: "alice"}, year: 2024) { id requestStatus } }"#,
    )
    .await;
    assert_eq!(response["data"]["legalDocument"]["id"], created["id"]);

    let response = execute(
        &schema,
        r#"{ legalDocument(host: {slug: "opensource"}, account: {slug: "alice"}, year: 2023) { id } }"#,
    )
    .await;
    assert!(response["data"]["legalDocument"].is_null());
}

#[tokio::test]
async fn references_accept_every_key() {
    let schema = seeded_schema().await;
    let ids = execute(&schema, r#"{ host: account(slug: "opensource") { id } account(slug: "bob") { legacyId } }"#).await;

    let response = create(
        &schema,
        serde_json::json!({
            "host": {"id": ids["data"]["host"]["id"]},
            "account": {"legacyId": ids["data"]["account"]["legacyId"]},
            "year": 2024,
            "requestStatus": "REQUESTED"
        }),
    )
    .await;
    let created = &response["data"]["createLegalDocument"];
    assert_eq!(created["requestStatus"], "REQUESTED");
    assert_eq!(created["account"]["slug"], "bob");

    // Seeded 2023 document for bob
    let response = execute(
        &schema,
        r#"{ legalDocument(host: {slug: "opensource"}, account: {slug: "bob"}, year: 2023) { requestStatus } }"#,
    )
    .await;
    assert_eq!(response["data"]["legalDocument"]["requestStatus"], "RECEIVED");
}

#[tokio::test]
async fn missing_reference_fails_validation() {
    let schema = seeded_schema().await;

    let response = create(
        &schema,
        serde_json::json!({"account": {"slug": "alice"}, "year": 2024}),
    )
    .await;
    assert_eq!(error_code(&response), "VALIDATION_ERROR");
    assert!(response["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("HostCollectiveId"));

    let response = create(
        &schema,
        serde_json::json!({"host": {"slug": "opensource"}, "year": 2024}),
    )
    .await;
    assert_eq!(error_code(&response), "VALIDATION_ERROR");
}

#[tokio::test]
async fn invalid_documents_are_rejected() {
    let schema = seeded_schema().await;

    let response = create(
        &schema,
        serde_json::json!({"host": {"slug": "opensource"}, "account": {"slug": "nobody"}, "year": 2024}),
    )
    .await;
    assert_eq!(error_code(&response), "NOT_FOUND");

    let response = create(
        &schema,
        serde_json::json!({"host": {"slug": "opensource"}, "account": {"slug": "alice"}, "year": 2010}),
    )
    .await;
    assert_eq!(error_code(&response), "VALIDATION_ERROR");

    // bob already has a 2023 document from the fixtures
    let response = create(
        &schema,
        serde_json::json!({"host": {"slug": "opensource"}, "account": {"slug": "bob"}, "year": 2023}),
    )
    .await;
    assert_eq!(error_code(&response), "VALIDATION_ERROR");
}

#[tokio::test]
async fn sqlite_backend_serves_the_same_api() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(DatabaseStorage::open(&dir.path().join("collectives.db")).unwrap());
    seed(storage.as_ref()).await;
    let schema = create_schema(storage.clone(), settings());

    let response = execute(
        &schema,
        r#"{ account(slug: "babel") {
            orders(sent: true, received: true, tierSlug: "backers") { totalCount }
            transactions(type: CREDIT) { totalCount }
            members(accountType: [ORGANIZATION]) { totalCount }
        } }"#,
    )
    .await;
    let account = &response["data"]["account"];
    assert_eq!(account["orders"]["totalCount"], 1);
    assert_eq!(account["transactions"]["totalCount"], 3);
    assert_eq!(account["members"]["totalCount"], 2);

    let response = create(
        &schema,
        serde_json::json!({"host": {"slug": "opensource"}, "account": {"slug": "babel"}, "year": 2022}),
    )
    .await;
    assert!(response.get("errors").is_none(), "{response}");

    let alice = storage.get_collective_by_slug("alice").await.unwrap().unwrap();
    let opensource = storage
        .get_collective_by_slug("opensource")
        .await
        .unwrap()
        .unwrap();
    let err = storage
        .create_legal_document(NewLegalDocument {
            collective_id: None,
            ..NewLegalDocument::new(opensource.id, alice.id, 2024)
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(storage
        .get_legal_document(opensource.id, alice.id, 2024, LegalDocumentType::UsTaxForm)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn storage_level_creation_requires_existing_collectives() {
    let storage = InMemoryStorage::new();
    seed(&storage).await;
    let host = storage.get_collective_by_slug("opensource").await.unwrap().unwrap();

    let err = storage
        .create_legal_document(NewLegalDocument::new(host.id, 424242, 2024))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

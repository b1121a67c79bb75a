#![allow(dead_code)]

use collectives_api::fixtures::Fixtures;
use collectives_api::graphql::{create_schema, GraphQLSchema, GraphQLSettings};
use collectives_api::storage::{InMemoryStorage, Storage};
use serde_json::Value;
use std::sync::Arc;

pub const IMAGES_URL: &str = "https://images.test";

pub fn settings() -> GraphQLSettings {
    GraphQLSettings {
        images_url: IMAGES_URL.to_string(),
        max_page_size: 1000,
    }
}

pub async fn seed(storage: &dyn Storage) {
    Fixtures::from_json(include_str!("../resources/fixtures.json"))
        .unwrap()
        .apply(storage)
        .await
        .unwrap();
}

/// Schema over an in-memory store loaded with the shared fixtures
pub async fn seeded_schema() -> GraphQLSchema {
    let storage = Arc::new(InMemoryStorage::new());
    seed(storage.as_ref()).await;
    create_schema(storage, settings())
}

/// Execute a query and return the whole response as JSON
pub async fn execute(schema: &GraphQLSchema, query: &str) -> Value {
    serde_json::to_value(schema.execute(query).await).unwrap()
}

/// `extensions.code` of the first error
pub fn error_code(response: &Value) -> &str {
    response["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_else(|| panic!("expected an error in {response}"))
}

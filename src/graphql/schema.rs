use crate::config::Config;
use crate::error::{AppError, Result};
use crate::graphql::loaders::AccountLoader;
use crate::graphql::resolvers::{Mutation, Query};
use crate::storage::Storage;
use async_graphql::dataloader::DataLoader;
use async_graphql::{EmptySubscription, Schema};
use std::sync::Arc;

/// Settings the resolvers need from the service configuration
#[derive(Debug, Clone)]
pub struct GraphQLSettings {
    pub images_url: String,
    pub max_page_size: i32,
}

impl From<&Config> for GraphQLSettings {
    fn from(config: &Config) -> Self {
        Self {
            images_url: config.images.base_url.trim_end_matches('/').to_string(),
            max_page_size: config.pagination.max_page_size,
        }
    }
}

impl GraphQLSettings {
    /// Check `limit`/`offset` arguments and convert them for the store
    pub fn page_bounds(&self, limit: i32, offset: i32) -> Result<(usize, usize)> {
        if !(0..=self.max_page_size).contains(&limit) {
            return Err(AppError::InvalidArgument(format!(
                "limit must be between 0 and {}, got {}",
                self.max_page_size, limit
            )));
        }
        if offset < 0 {
            return Err(AppError::InvalidArgument(format!(
                "offset must be positive, got {offset}"
            )));
        }
        Ok((limit as usize, offset as usize))
    }
}

/// GraphQL context containing shared application state
pub struct GraphQLContext {
    pub storage: Arc<dyn Storage>,
    pub accounts: DataLoader<AccountLoader>,
    pub settings: GraphQLSettings,
}

/// The complete GraphQL schema
pub type GraphQLSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create a new GraphQL schema with the given storage
pub fn create_schema(storage: Arc<dyn Storage>, settings: GraphQLSettings) -> GraphQLSchema {
    let accounts = AccountLoader::new(storage.clone());
    Schema::build(Query, Mutation, EmptySubscription)
        .data(GraphQLContext {
            storage,
            accounts,
            settings,
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_are_enforced() {
        let settings = GraphQLSettings {
            images_url: "https://images.example.org".to_string(),
            max_page_size: 50,
        };
        assert_eq!(settings.page_bounds(50, 10).unwrap(), (50, 10));
        assert_eq!(settings.page_bounds(0, 0).unwrap(), (0, 0));
        assert_eq!(settings.page_bounds(51, 0).unwrap_err().code(), "INVALID_ARGUMENT");
        assert_eq!(settings.page_bounds(-1, 0).unwrap_err().code(), "INVALID_ARGUMENT");
        assert_eq!(settings.page_bounds(10, -5).unwrap_err().code(), "INVALID_ARGUMENT");
    }
}

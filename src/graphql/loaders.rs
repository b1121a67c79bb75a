use crate::domain::Collective;
use crate::storage::Storage;
use async_graphql::dataloader::{DataLoader, Loader};
use std::collections::HashMap;
use std::sync::Arc;

/// DataLoader for batching account lookups by row id
pub struct AccountLoader {
    storage: Arc<dyn Storage>,
}

impl AccountLoader {
    pub fn new(storage: Arc<dyn Storage>) -> DataLoader<Self> {
        DataLoader::new(Self { storage }, tokio::spawn)
    }
}

impl Loader<i64> for AccountLoader {
    type Value = Collective;
    type Error = String;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        let collectives = self
            .storage
            .get_collectives_by_ids(keys)
            .await
            .map_err(|e| e.to_string())?;

        Ok(collectives.into_iter().map(|c| (c.id, c)).collect())
    }
}

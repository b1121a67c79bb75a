pub mod mutation;
pub mod query;

pub use mutation::Mutation;
pub use query::Query;

use crate::domain::Collective;
use crate::error::{AppError, Result};
use crate::graphql::ids::{self, Entity};
use crate::graphql::types::AccountReferenceInput;
use crate::storage::Storage;

/// Look up the account an input reference points at
pub(crate) async fn fetch_account(
    storage: &dyn Storage,
    reference: &AccountReferenceInput,
) -> Result<Collective> {
    let (found, description) = match reference {
        AccountReferenceInput::Id(id) => {
            let row_id = ids::decode(Entity::Account, id)?;
            (storage.get_collective_by_id(row_id).await?, format!("id `{}`", id.as_str()))
        }
        AccountReferenceInput::LegacyId(legacy_id) => (
            storage.get_collective_by_id(*legacy_id).await?,
            format!("legacyId {legacy_id}"),
        ),
        AccountReferenceInput::Slug(slug) => (
            storage.get_collective_by_slug(slug).await?,
            format!("slug `{slug}`"),
        ),
    };
    found.ok_or_else(|| AppError::NotFound(format!("Account with {description} not found")))
}

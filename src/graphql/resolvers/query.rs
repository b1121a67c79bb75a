use super::fetch_account;
use crate::error::AppError;
use crate::graphql::ids::{self, Entity};
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::enums::LegalDocumentType;
use crate::graphql::types::{Account, AccountReferenceInput, LegalDocument};
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};

/// Root query object for GraphQL
pub struct Query;

#[Object]
impl Query {
    /// Get an account by id or slug; exactly one must be given
    async fn account(
        &self,
        ctx: &Context<'_>,
        id: Option<ID>,
        slug: Option<String>,
    ) -> FieldResult<Option<Account>> {
        let context = ctx.data::<GraphQLContext>()?;

        let found = match (id, slug) {
            (Some(id), None) => {
                let row_id = ids::decode(Entity::Account, &id).map_err(|e| e.extend())?;
                context.storage.get_collective_by_id(row_id).await
            }
            (None, Some(slug)) => context.storage.get_collective_by_slug(&slug).await,
            _ => {
                return Err(AppError::InvalidArgument(
                    "Please provide exactly one of id or slug".to_string(),
                )
                .extend())
            }
        };

        match found {
            Ok(collective) => Ok(collective.map(Account::from)),
            Err(e) => Err(e.extend()),
        }
    }

    /// Get the legal document a host holds for an account for one year
    async fn legal_document(
        &self,
        ctx: &Context<'_>,
        host: AccountReferenceInput,
        account: AccountReferenceInput,
        year: i32,
        #[graphql(default_with = "LegalDocumentType::UsTaxForm")] document_type: LegalDocumentType,
    ) -> FieldResult<Option<LegalDocument>> {
        let context = ctx.data::<GraphQLContext>()?;
        let storage = context.storage.as_ref();

        let host = fetch_account(storage, &host).await.map_err(|e| e.extend())?;
        let account = fetch_account(storage, &account)
            .await
            .map_err(|e| e.extend())?;

        match storage
            .get_legal_document(host.id, account.id, year, document_type.into())
            .await
        {
            Ok(document) => Ok(document.map(LegalDocument::from)),
            Err(e) => Err(e.extend()),
        }
    }
}

use super::fetch_account;
use crate::domain::NewLegalDocument;
use crate::graphql::schema::GraphQLContext;
use crate::graphql::types::{LegalDocument, LegalDocumentCreateInput};
use async_graphql::{Context, ErrorExtensions, FieldResult, Object};
use tracing::info;

/// Root mutation object for GraphQL
pub struct Mutation;

#[Object]
impl Mutation {
    /// Record a legal document for an account under a host
    async fn create_legal_document(
        &self,
        ctx: &Context<'_>,
        legal_document: LegalDocumentCreateInput,
    ) -> FieldResult<LegalDocument> {
        let context = ctx.data::<GraphQLContext>()?;
        let storage = context.storage.as_ref();

        let host = match &legal_document.host {
            Some(reference) => Some(
                fetch_account(storage, reference)
                    .await
                    .map_err(|e| e.extend())?
                    .id,
            ),
            None => None,
        };
        let account = match &legal_document.account {
            Some(reference) => Some(
                fetch_account(storage, reference)
                    .await
                    .map_err(|e| e.extend())?
                    .id,
            ),
            None => None,
        };

        let new_document = NewLegalDocument {
            host_collective_id: host,
            collective_id: account,
            year: legal_document.year,
            document_type: legal_document.document_type.into(),
            request_status: legal_document.request_status.into(),
            document_link: legal_document.document_link,
        };

        let created = storage
            .create_legal_document(new_document)
            .await
            .map_err(|e| e.extend())?;
        info!(
            "Created {} legal document {} for {} (host {})",
            created.year, created.id, created.collective_id, created.host_collective_id
        );
        Ok(created.into())
    }
}

use super::account::{load_account, Account};
use super::enums::{LegalDocumentRequestStatus, LegalDocumentType};
use crate::domain;
use crate::graphql::ids::{self, Entity};
use async_graphql::{Context, FieldResult, InputObject, Object, OneofObject, ID};
use chrono::{DateTime, Utc};

/// A tax form or similar document a host collects from an account
#[derive(Clone)]
pub struct LegalDocument {
    pub inner: domain::LegalDocument,
}

impl From<domain::LegalDocument> for LegalDocument {
    fn from(document: domain::LegalDocument) -> Self {
        Self { inner: document }
    }
}

#[Object]
impl LegalDocument {
    async fn id(&self) -> ID {
        ids::encode(Entity::LegalDocument, self.inner.id)
    }

    async fn legacy_id(&self) -> i64 {
        self.inner.id
    }

    /// Tax year the document covers
    async fn year(&self) -> i32 {
        self.inner.year
    }

    async fn document_type(&self) -> LegalDocumentType {
        self.inner.document_type.into()
    }

    async fn request_status(&self) -> LegalDocumentRequestStatus {
        self.inner.request_status.into()
    }

    async fn document_link(&self) -> Option<&str> {
        self.inner.document_link.as_deref()
    }

    /// The host requesting the document
    async fn host(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.host_collective_id).await
    }

    /// The account the document is about
    async fn account(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.collective_id).await
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.inner.updated_at
    }
}

/// Points at an existing account by exactly one of its keys
#[derive(OneofObject, Clone, Debug)]
pub enum AccountReferenceInput {
    /// Opaque account id
    Id(ID),
    LegacyId(i64),
    Slug(String),
}

#[derive(InputObject, Clone, Debug)]
pub struct LegalDocumentCreateInput {
    pub host: Option<AccountReferenceInput>,
    pub account: Option<AccountReferenceInput>,
    pub year: i32,
    #[graphql(default_with = "LegalDocumentType::UsTaxForm")]
    pub document_type: LegalDocumentType,
    #[graphql(default_with = "LegalDocumentRequestStatus::NotRequested")]
    pub request_status: LegalDocumentRequestStatus,
    pub document_link: Option<String>,
}

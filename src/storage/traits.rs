use super::query::{MemberQuery, OrderQuery, Page, TransactionQuery};
use crate::domain::*;
use crate::error::Result;
use async_trait::async_trait;

/// Storage trait for the relational model (accounts, tiers, ledger, orders,
/// memberships and legal documents)
#[async_trait]
pub trait Storage: Send + Sync {
    // Account operations
    async fn create_collective(&self, collective: &mut Collective) -> Result<()>;
    async fn get_collective_by_id(&self, id: i64) -> Result<Option<Collective>>;
    async fn get_collective_by_slug(&self, slug: &str) -> Result<Option<Collective>>;
    async fn get_collectives_by_ids(&self, ids: &[i64]) -> Result<Vec<Collective>>;

    // Tier operations
    async fn create_tier(&self, tier: &mut Tier) -> Result<()>;
    async fn get_tier_by_id(&self, id: i64) -> Result<Option<Tier>>;
    /// Tier of `collective_id` with the given slug
    async fn get_tier_by_slug(&self, collective_id: i64, slug: &str) -> Result<Option<Tier>>;

    // Ledger operations
    async fn create_transaction(&self, transaction: &mut Transaction) -> Result<()>;
    async fn find_transactions(&self, query: &TransactionQuery) -> Result<Page<Transaction>>;

    // Order operations
    async fn create_order(&self, order: &mut Order) -> Result<()>;
    async fn find_orders(&self, query: &OrderQuery) -> Result<Page<Order>>;

    // Membership operations
    async fn create_member(&self, member: &mut Member) -> Result<()>;
    async fn find_members(&self, query: &MemberQuery) -> Result<Page<Member>>;

    // Legal documents
    /// Fails with a validation error unless both referenced collectives exist
    async fn create_legal_document(&self, document: NewLegalDocument) -> Result<LegalDocument>;
    async fn get_legal_document(
        &self,
        host_collective_id: i64,
        collective_id: i64,
        year: i32,
        document_type: LegalDocumentType,
    ) -> Result<Option<LegalDocument>>;
}

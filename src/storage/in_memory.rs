use super::query::*;
use super::traits::Storage;
use crate::domain::*;
use crate::error::{AppError, Result};
use crate::observability::metrics;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Tables {
    next_id: i64,
    collectives: HashMap<i64, Collective>,
    tiers: HashMap<i64, Tier>,
    transactions: HashMap<i64, Transaction>,
    orders: HashMap<i64, Order>,
    members: HashMap<i64, Member>,
    legal_documents: HashMap<i64, LegalDocument>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_collective(&self, id: i64, field: &str) -> Result<()> {
        if self.collectives.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "{field} references unknown collective {id}"
            )))
        }
    }
}

/// In-memory storage implementation for development/testing
#[derive(Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| AppError::Database {
            message: "in-memory store lock poisoned".to_string(),
        })
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_collective(&self, collective: &mut Collective) -> Result<()> {
        validate_slug(&collective.slug)?;
        let mut tables = self.tables()?;
        if tables.collectives.values().any(|c| c.slug == collective.slug) {
            return Err(AppError::Validation(format!(
                "Slug `{}` is already taken",
                collective.slug
            )));
        }

        collective.id = tables.next_id();
        tables.collectives.insert(collective.id, collective.clone());

        debug!("Created collective: {} with id {}", collective.slug, collective.id);
        Ok(())
    }

    async fn get_collective_by_id(&self, id: i64) -> Result<Option<Collective>> {
        Ok(self.tables()?.collectives.get(&id).cloned())
    }

    async fn get_collective_by_slug(&self, slug: &str) -> Result<Option<Collective>> {
        let slug = slug.to_lowercase();
        let tables = self.tables()?;
        Ok(tables.collectives.values().find(|c| c.slug == slug).cloned())
    }

    async fn get_collectives_by_ids(&self, ids: &[i64]) -> Result<Vec<Collective>> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.collectives.get(id).cloned())
            .collect())
    }

    async fn create_tier(&self, tier: &mut Tier) -> Result<()> {
        validate_slug(&tier.slug)?;
        let mut tables = self.tables()?;
        tables.require_collective(tier.collective_id, "Tier.CollectiveId")?;
        if tables
            .tiers
            .values()
            .any(|t| t.collective_id == tier.collective_id && t.slug == tier.slug)
        {
            return Err(AppError::Validation(format!(
                "Tier `{}` already exists for collective {}",
                tier.slug, tier.collective_id
            )));
        }

        tier.id = tables.next_id();
        tables.tiers.insert(tier.id, tier.clone());

        debug!("Created tier: {} with id {}", tier.slug, tier.id);
        Ok(())
    }

    async fn get_tier_by_id(&self, id: i64) -> Result<Option<Tier>> {
        Ok(self.tables()?.tiers.get(&id).cloned())
    }

    async fn get_tier_by_slug(&self, collective_id: i64, slug: &str) -> Result<Option<Tier>> {
        let slug = slug.to_lowercase();
        let tables = self.tables()?;
        Ok(tables
            .tiers
            .values()
            .find(|t| t.collective_id == collective_id && t.slug == slug)
            .cloned())
    }

    async fn create_transaction(&self, transaction: &mut Transaction) -> Result<()> {
        let mut tables = self.tables()?;
        tables.require_collective(transaction.collective_id, "Transaction.CollectiveId")?;
        tables.require_collective(
            transaction.from_collective_id,
            "Transaction.FromCollectiveId",
        )?;

        transaction.id = tables.next_id();
        tables.transactions.insert(transaction.id, transaction.clone());

        debug!("Created transaction {} ({})", transaction.id, transaction.kind);
        Ok(())
    }

    async fn find_transactions(&self, query: &TransactionQuery) -> Result<Page<Transaction>> {
        metrics::storage::query("Transactions");
        let tables = self.tables()?;
        let mut matching: Vec<Transaction> = tables
            .transactions
            .values()
            .filter(|t| {
                t.collective_id == query.collective_id
                    && query.kind.map_or(true, |kind| t.kind == kind)
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match query.sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Amount => a.amount.cmp(&b.amount),
            };
            query.sort.direction.apply(ordering.then(a.id.cmp(&b.id)))
        });

        Ok(Page::from_sorted(matching, query.limit, query.offset))
    }

    async fn create_order(&self, order: &mut Order) -> Result<()> {
        let mut tables = self.tables()?;
        tables.require_collective(order.collective_id, "Order.CollectiveId")?;
        tables.require_collective(order.from_collective_id, "Order.FromCollectiveId")?;
        if let Some(tier_id) = order.tier_id {
            if !tables.tiers.contains_key(&tier_id) {
                return Err(AppError::Validation(format!(
                    "Order.TierId references unknown tier {tier_id}"
                )));
            }
        }

        order.id = tables.next_id();
        tables.orders.insert(order.id, order.clone());

        debug!("Created order {} with status {}", order.id, order.status);
        Ok(())
    }

    async fn find_orders(&self, query: &OrderQuery) -> Result<Page<Order>> {
        metrics::storage::query("Orders");
        let tables = self.tables()?;
        let mut matching: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| {
                query
                    .participation
                    .matches(query.account_id, o.collective_id, o.from_collective_id)
                    && query.status.map_or(true, |status| o.status == status)
                    && query.tier_id.map_or(true, |tier_id| o.tier_id == Some(tier_id))
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match query.sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Amount => a.total_amount.cmp(&b.total_amount),
            };
            query.sort.direction.apply(ordering.then(a.id.cmp(&b.id)))
        });

        Ok(Page::from_sorted(matching, query.limit, query.offset))
    }

    async fn create_member(&self, member: &mut Member) -> Result<()> {
        let mut tables = self.tables()?;
        tables.require_collective(member.collective_id, "Member.CollectiveId")?;
        tables.require_collective(member.member_collective_id, "Member.MemberCollectiveId")?;

        member.id = tables.next_id();
        tables.members.insert(member.id, member.clone());

        debug!(
            "Created member {} -> {} as {}",
            member.member_collective_id, member.collective_id, member.role
        );
        Ok(())
    }

    async fn find_members(&self, query: &MemberQuery) -> Result<Page<Member>> {
        metrics::storage::query("Members");
        let tables = self.tables()?;
        let mut matching: Vec<Member> = tables
            .members
            .values()
            .filter(|m| {
                let (own_side, other_side) = match query.direction {
                    MemberDirection::Members => (m.collective_id, m.member_collective_id),
                    MemberDirection::MemberOf => (m.member_collective_id, m.collective_id),
                };
                own_side == query.account_id
                    && (query.roles.is_empty() || query.roles.contains(&m.role))
                    && (query.account_types.is_empty()
                        || tables
                            .collectives
                            .get(&other_side)
                            .is_some_and(|c| query.account_types.contains(&c.kind)))
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(Page::from_sorted(matching, query.limit, query.offset))
    }

    async fn create_legal_document(&self, document: NewLegalDocument) -> Result<LegalDocument> {
        let (host, collective) = document.validate()?;
        let mut tables = self.tables()?;
        tables.require_collective(host, "LegalDocument.HostCollectiveId")?;
        tables.require_collective(collective, "LegalDocument.CollectiveId")?;
        if tables.legal_documents.values().any(|d| {
            d.host_collective_id == host
                && d.collective_id == collective
                && d.year == document.year
                && d.document_type == document.document_type
        }) {
            return Err(AppError::Validation(format!(
                "A {} legal document already exists for collective {collective} and host {host} in {}",
                document.document_type, document.year
            )));
        }

        let id = tables.next_id();
        let created = document.into_document(id, host, collective);
        tables.legal_documents.insert(id, created.clone());

        metrics::storage::legal_document_created();
        debug!("Created legal document {} for collective {}", id, collective);
        Ok(created)
    }

    async fn get_legal_document(
        &self,
        host_collective_id: i64,
        collective_id: i64,
        year: i32,
        document_type: LegalDocumentType,
    ) -> Result<Option<LegalDocument>> {
        let tables = self.tables()?;
        Ok(tables
            .legal_documents
            .values()
            .find(|d| {
                d.host_collective_id == host_collective_id
                    && d.collective_id == collective_id
                    && d.year == year
                    && d.document_type == document_type
            })
            .cloned())
    }
}

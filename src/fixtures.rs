//! Seed data loaded into a store at startup (`serve --fixtures`) and by tests.
//!
//! Rows refer to accounts and tiers by slug; ids are assigned by the store.

use crate::domain::*;
use crate::error::{AppError, Result};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub collectives: Vec<Collective>,
    pub tiers: Vec<TierFixture>,
    pub transactions: Vec<TransactionFixture>,
    pub orders: Vec<OrderFixture>,
    pub members: Vec<MemberFixture>,
    pub legal_documents: Vec<LegalDocumentFixture>,
}

#[derive(Debug, Deserialize)]
pub struct TierFixture {
    pub collective: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionFixture {
    pub collective: String,
    pub from_collective: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: i64,
    #[serde(default)]
    pub net_amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    pub collective: String,
    pub from_collective: String,
    pub total_amount: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct MemberFixture {
    pub collective: String,
    pub member: String,
    pub role: MemberRole,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct LegalDocumentFixture {
    pub host: String,
    pub collective: String,
    pub year: i32,
    #[serde(default)]
    pub request_status: LegalDocumentRequestStatus,
}

/// Row counts inserted by [`Fixtures::apply`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixtureSummary {
    pub collectives: usize,
    pub tiers: usize,
    pub transactions: usize,
    pub orders: usize,
    pub members: usize,
    pub legal_documents: usize,
}

/// Slug -> id lookups for rows created by the fixtures
#[derive(Default)]
struct Slugs {
    accounts: HashMap<String, (i64, String)>,
    tiers: HashMap<(i64, String), i64>,
}

impl Slugs {
    fn account(&self, slug: &str) -> Result<(i64, &str)> {
        self.accounts
            .get(slug)
            .map(|(id, currency)| (*id, currency.as_str()))
            .ok_or_else(|| AppError::Validation(format!("Unknown account `{slug}` in fixtures")))
    }

    fn tier(&self, collective_id: i64, slug: Option<&str>) -> Result<Option<i64>> {
        match slug {
            None => Ok(None),
            Some(slug) => self
                .tiers
                .get(&(collective_id, slug.to_string()))
                .copied()
                .map(Some)
                .ok_or_else(|| AppError::Validation(format!("Unknown tier `{slug}` in fixtures"))),
        }
    }
}

impl Fixtures {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Insert every row, in dependency order
    pub async fn apply(self, storage: &dyn Storage) -> Result<FixtureSummary> {
        let mut slugs = Slugs::default();
        let mut summary = FixtureSummary::default();

        for mut collective in self.collectives {
            storage.create_collective(&mut collective).await?;
            slugs.accounts.insert(
                collective.slug.clone(),
                (collective.id, collective.currency.clone()),
            );
            summary.collectives += 1;
        }

        for fixture in self.tiers {
            let (collective_id, currency) = slugs.account(&fixture.collective)?;
            let mut tier = Tier {
                id: 0,
                collective_id,
                slug: fixture.slug,
                name: fixture.name,
                amount: fixture.amount,
                currency: fixture.currency.unwrap_or_else(|| currency.to_string()),
            };
            storage.create_tier(&mut tier).await?;
            slugs.tiers.insert((collective_id, tier.slug.clone()), tier.id);
            summary.tiers += 1;
        }

        for fixture in self.orders {
            let (collective_id, currency) = slugs.account(&fixture.collective)?;
            let (from_collective_id, _) = slugs.account(&fixture.from_collective)?;
            let created_at = fixture.created_at.unwrap_or_else(Utc::now);
            let mut order = Order {
                id: 0,
                description: fixture.description,
                total_amount: fixture.total_amount,
                currency: fixture.currency.unwrap_or_else(|| currency.to_string()),
                status: fixture.status,
                interval: fixture.interval,
                collective_id,
                from_collective_id,
                tier_id: slugs.tier(collective_id, fixture.tier.as_deref())?,
                created_at,
                updated_at: created_at,
            };
            storage.create_order(&mut order).await?;
            summary.orders += 1;
        }

        for fixture in self.transactions {
            let (collective_id, currency) = slugs.account(&fixture.collective)?;
            let (from_collective_id, _) = slugs.account(&fixture.from_collective)?;
            let created_at = fixture.created_at.unwrap_or_else(Utc::now);
            let mut transaction = Transaction {
                id: 0,
                uuid: Uuid::new_v4(),
                kind: fixture.kind,
                description: fixture.description,
                amount: fixture.amount,
                currency: fixture.currency.unwrap_or_else(|| currency.to_string()),
                net_amount_in_collective_currency: fixture.net_amount.unwrap_or(fixture.amount),
                collective_id,
                from_collective_id,
                order_id: None,
                created_at,
                updated_at: created_at,
            };
            storage.create_transaction(&mut transaction).await?;
            summary.transactions += 1;
        }

        for fixture in self.members {
            let (collective_id, _) = slugs.account(&fixture.collective)?;
            let (member_collective_id, _) = slugs.account(&fixture.member)?;
            let since = fixture.since.unwrap_or_else(Utc::now);
            let mut member = Member {
                id: 0,
                collective_id,
                member_collective_id,
                role: fixture.role,
                tier_id: slugs.tier(collective_id, fixture.tier.as_deref())?,
                description: fixture.description,
                since,
                created_at: since,
            };
            storage.create_member(&mut member).await?;
            summary.members += 1;
        }

        for fixture in self.legal_documents {
            let (host, _) = slugs.account(&fixture.host)?;
            let (collective, _) = slugs.account(&fixture.collective)?;
            let mut document = NewLegalDocument::new(host, collective, fixture.year);
            document.request_status = fixture.request_status;
            storage.create_legal_document(document).await?;
            summary.legal_documents += 1;
        }

        info!("Loaded fixtures: {:?}", summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    #[tokio::test]
    async fn slugs_resolve_to_assigned_ids() {
        let fixtures = Fixtures::from_json(
            r#"{
                "collectives": [
                    {"slug": "alice", "name": "Alice", "type": "USER"},
                    {"slug": "babel", "name": "Babel", "type": "COLLECTIVE", "currency": "EUR"}
                ],
                "tiers": [{"collective": "babel", "slug": "backers", "name": "Backers", "amount": 500}],
                "orders": [{
                    "collective": "babel", "from_collective": "alice",
                    "total_amount": 500, "status": "ACTIVE", "tier": "backers", "interval": "month"
                }]
            }"#,
        )
        .unwrap();

        let storage = InMemoryStorage::new();
        let summary = fixtures.apply(&storage).await.unwrap();
        assert_eq!(summary.collectives, 2);
        assert_eq!(summary.orders, 1);

        let babel = storage.get_collective_by_slug("babel").await.unwrap().unwrap();
        let tier = storage
            .get_tier_by_slug(babel.id, "backers")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tier.currency, "EUR");
    }

    #[tokio::test]
    async fn unknown_slug_is_reported() {
        let fixtures = Fixtures::from_json(
            r#"{"tiers": [{"collective": "ghost", "slug": "gold", "name": "Gold"}]}"#,
        )
        .unwrap();
        let err = fixtures.apply(&InMemoryStorage::new()).await.unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}

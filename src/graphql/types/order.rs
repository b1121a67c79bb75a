use super::account::{load_account, Account};
use super::enums::{ContributionFrequency, OrderStatus};
use super::tier::{load_tier, Tier};
use super::Amount;
use crate::domain;
use crate::graphql::ids::{self, Entity};
use async_graphql::{Context, FieldResult, Object, ID};
use chrono::{DateTime, Utc};

/// A pledge from one account to another
#[derive(Clone)]
pub struct Order {
    pub inner: domain::Order,
}

impl From<domain::Order> for Order {
    fn from(order: domain::Order) -> Self {
        Self { inner: order }
    }
}

#[Object]
impl Order {
    async fn id(&self) -> ID {
        ids::encode(Entity::Order, self.inner.id)
    }

    async fn legacy_id(&self) -> i64 {
        self.inner.id
    }

    async fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    async fn amount(&self) -> Amount {
        Amount::from_cents(self.inner.total_amount, &self.inner.currency)
    }

    async fn status(&self) -> OrderStatus {
        self.inner.status.into()
    }

    async fn frequency(&self) -> ContributionFrequency {
        ContributionFrequency::from_interval(self.inner.interval.as_deref())
    }

    /// The tier this order contributes to, if any
    async fn tier(&self, ctx: &Context<'_>) -> FieldResult<Option<Tier>> {
        load_tier(ctx, self.inner.tier_id).await
    }

    async fn from_account(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.from_collective_id).await
    }

    async fn to_account(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.collective_id).await
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }
}

use super::account::{load_account, Account};
use super::enums::TransactionType;
use super::Amount;
use crate::domain;
use crate::graphql::ids::{self, Entity};
use async_graphql::{Context, FieldResult, Object, ID};
use chrono::{DateTime, Utc};

/// A ledger entry
#[derive(Clone)]
pub struct Transaction {
    pub inner: domain::Transaction,
}

impl From<domain::Transaction> for Transaction {
    fn from(transaction: domain::Transaction) -> Self {
        Self { inner: transaction }
    }
}

#[Object]
impl Transaction {
    async fn id(&self) -> ID {
        ids::encode(Entity::Transaction, self.inner.id)
    }

    async fn legacy_id(&self) -> i64 {
        self.inner.id
    }

    async fn uuid(&self) -> String {
        self.inner.uuid.to_string()
    }

    #[graphql(name = "type")]
    async fn kind(&self) -> TransactionType {
        self.inner.kind.into()
    }

    async fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Gross amount, negative for debits
    async fn amount(&self) -> Amount {
        Amount::from_cents(self.inner.amount, &self.inner.currency)
    }

    /// Amount after fees, in the owning collective's currency
    async fn net_amount(&self) -> Amount {
        Amount::from_cents(
            self.inner.net_amount_in_collective_currency,
            &self.inner.currency,
        )
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// The account the money came from
    async fn from_account(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.from_collective_id).await
    }

    /// The account that owns this entry
    async fn to_account(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.collective_id).await
    }
}

use super::account::{load_account, Account};
use super::enums::MemberRole;
use super::tier::{load_tier, Tier};
use crate::domain;
use async_graphql::{Context, FieldResult, Object};
use chrono::{DateTime, Utc};

/// An account that is a member of the queried account
#[derive(Clone)]
pub struct Member {
    pub inner: domain::Member,
}

impl From<domain::Member> for Member {
    fn from(member: domain::Member) -> Self {
        Self { inner: member }
    }
}

#[Object]
impl Member {
    async fn role(&self) -> MemberRole {
        self.inner.role.into()
    }

    async fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    async fn since(&self) -> DateTime<Utc> {
        self.inner.since
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    async fn tier(&self, ctx: &Context<'_>) -> FieldResult<Option<Tier>> {
        load_tier(ctx, self.inner.tier_id).await
    }

    /// The member
    async fn account(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.member_collective_id).await
    }
}

/// An account the queried account is a member of
#[derive(Clone)]
pub struct MemberOf {
    pub inner: domain::Member,
}

impl From<domain::Member> for MemberOf {
    fn from(member: domain::Member) -> Self {
        Self { inner: member }
    }
}

#[Object]
impl MemberOf {
    async fn role(&self) -> MemberRole {
        self.inner.role.into()
    }

    async fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    async fn since(&self) -> DateTime<Utc> {
        self.inner.since
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    async fn tier(&self, ctx: &Context<'_>) -> FieldResult<Option<Tier>> {
        load_tier(ctx, self.inner.tier_id).await
    }

    /// The account joined
    async fn account(&self, ctx: &Context<'_>) -> FieldResult<Option<Account>> {
        load_account(ctx, self.inner.collective_id).await
    }
}

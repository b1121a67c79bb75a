use super::Amount;
use crate::domain;
use crate::error::AppError;
use crate::graphql::ids::{self, Entity};
use crate::graphql::schema::GraphQLContext;
use async_graphql::{Context, ErrorExtensions, FieldResult, Object, ID};

/// A named contribution level of an account
#[derive(Clone)]
pub struct Tier {
    pub inner: domain::Tier,
}

impl From<domain::Tier> for Tier {
    fn from(tier: domain::Tier) -> Self {
        Self { inner: tier }
    }
}

/// Resolve an optional tier reference of an order or membership
pub(crate) async fn load_tier(ctx: &Context<'_>, tier_id: Option<i64>) -> FieldResult<Option<Tier>> {
    let Some(tier_id) = tier_id else {
        return Ok(None);
    };
    let context = ctx.data::<GraphQLContext>()?;
    let tier = context
        .storage
        .get_tier_by_id(tier_id)
        .await
        .map_err(|e: AppError| e.extend())?;
    Ok(tier.map(Tier::from))
}

#[Object]
impl Tier {
    async fn id(&self) -> ID {
        ids::encode(Entity::Tier, self.inner.id)
    }

    async fn legacy_id(&self) -> i64 {
        self.inner.id
    }

    async fn slug(&self) -> &str {
        &self.inner.slug
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    /// Suggested amount; flexible tiers have none
    async fn amount(&self) -> Option<Amount> {
        self.inner
            .amount
            .map(|cents| Amount::from_cents(cents, &self.inner.currency))
    }
}
